pub mod db;
pub mod http;

#[cfg(target_os = "macos")]
pub mod macos;
pub mod mdm;

pub use db::DbManager;
pub use http::{HttpClient, HttpError, RetryConfig};
#[cfg(target_os = "macos")]
pub use macos::{
    check_ax_permission, ActivityContext, ActivityError, MacOsActivityProvider, WindowContext,
};
pub use mdm::{MdmClient, MdmClientBuilder, MdmConfig, PolicySetting, PolicyValue};
