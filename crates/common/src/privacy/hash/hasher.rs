// Secure Hashing for Non-Allowed Domains
// Reference: PART-1-OVERVIEW-AND-FOUNDATION.md lines 346-349

use sha2::{Digest, Sha256, Sha384, Sha512};

use super::config::{HashAlgorithm, HashConfig};
use super::error::{HashError, HashResult};

#[derive(Debug)]
pub struct SecureHasher {
    config: HashConfig,
}

impl SecureHasher {
    pub fn new() -> HashResult<Self> {
        let config = HashConfig::new()?;
        Ok(Self { config })
    }

    pub fn with_config(config: HashConfig) -> HashResult<Self> {
        if config.org_salt.is_empty() {
            return Err(HashError::ConfigurationError("Organization salt must be set".to_string()));
        }
        Ok(Self { config })
    }

    pub fn hash_domain(&self, domain: &str) -> HashResult<String> {
        if domain.is_empty() {
            return Err(HashError::InvalidInput("Domain cannot be empty".to_string()));
        }

        let input = format!("{}{}", domain, self.config.org_salt);

        let hash = match self.config.algorithm {
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(input.as_bytes());
                format!("{:x}", hasher.finalize())
            }
            HashAlgorithm::Sha384 => {
                let mut hasher = Sha384::new();
                hasher.update(input.as_bytes());
                format!("{:x}", hasher.finalize())
            }
            HashAlgorithm::Sha512 => {
                let mut hasher = Sha512::new();
                hasher.update(input.as_bytes());
                format!("{:x}", hasher.finalize())
            }
        };

        Ok(hash)
    }

    pub fn hash_multiple_domains(&self, domains: &[&str]) -> HashResult<Vec<String>> {
        domains.iter().map(|domain| self.hash_domain(domain)).collect()
    }

    pub fn rotate_salt(&mut self) -> HashResult<()> {
        self.config.generate_org_salt()
    }

    pub fn get_config(&self) -> &HashConfig {
        &self.config
    }
}

impl Default for SecureHasher {
    fn default() -> Self {
        Self::new().expect("Failed to create default SecureHasher")
    }
}
