//! Declarative framework wiring.
//!
//! Installed applications, middleware order, template engines and
//! password validators do not depend on the environment. They are
//! resolved alongside everything else so the whole settings surface lives
//! in one snapshot.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Framework-level settings that are constant across environments.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FrameworkSettings {
    /// Enabled application components, in load order.
    pub installed_apps: Vec<String>,

    /// Request/response middleware, outermost first.
    pub middleware: Vec<Middleware>,

    /// Module path of the root URL configuration.
    pub root_urlconf: String,

    /// Entry point the application server loads.
    pub server_entry_point: String,

    pub templates: Vec<TemplateEngine>,

    pub password_validators: Vec<PasswordValidator>,

    pub localization: Localization,

    /// Primary-key type for models without an explicit one.
    pub default_auto_field: String,
}

impl FrameworkSettings {
    /// Settings for the application rooted at `base_dir`.
    pub fn for_base_dir(base_dir: &Path) -> Self {
        Self {
            installed_apps: [
                "contrib.admin",
                "contrib.auth",
                "contrib.contenttypes",
                "contrib.sessions",
                "contrib.messages",
                "static_files.runserver_nostatic",
                "contrib.staticfiles",
                "application.main",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            middleware: Middleware::DEFAULT_CHAIN.to_vec(),
            root_urlconf: "application._core.urls".to_string(),
            server_entry_point: "application._core.wsgi.application".to_string(),
            templates: vec![TemplateEngine::builtin(base_dir)],
            password_validators: PasswordValidator::default_set(),
            localization: Localization::default(),
            default_auto_field: "BigAutoField".to_string(),
        }
    }

    pub fn has_middleware(&self, middleware: Middleware) -> bool {
        self.middleware.contains(&middleware)
    }
}

/// Middleware components, listed in the order they wrap requests.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Middleware {
    /// HTTPS redirect, HSTS, host validation and content-type headers.
    Security,
    /// Serves collected static files ahead of the application.
    StaticFiles,
    Session,
    Common,
    Csrf,
    Authentication,
    Messages,
    /// `X-Frame-Options` clickjacking protection.
    Clickjacking,
}

impl Middleware {
    pub const DEFAULT_CHAIN: [Middleware; 8] = [
        Middleware::Security,
        Middleware::StaticFiles,
        Middleware::Session,
        Middleware::Common,
        Middleware::Csrf,
        Middleware::Authentication,
        Middleware::Messages,
        Middleware::Clickjacking,
    ];

    /// Whether this crate provides the layer itself.
    ///
    /// The rest belong to the hosting framework.
    pub fn is_provided(&self) -> bool {
        matches!(
            self,
            Middleware::Security | Middleware::StaticFiles | Middleware::Clickjacking
        )
    }
}

/// Template engine configuration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TemplateEngine {
    pub backend: String,

    /// Project-level template directories searched first.
    pub dirs: Vec<PathBuf>,

    /// Also search each installed app's `templates/` directory.
    pub app_dirs: bool,

    pub context_processors: Vec<String>,
}

impl TemplateEngine {
    fn builtin(base_dir: &Path) -> Self {
        Self {
            backend: "builtin".to_string(),
            dirs: vec![base_dir.join("templates")],
            app_dirs: true,
            context_processors: ["debug", "request", "auth", "messages"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Password validation rules applied when users set a password.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum PasswordValidator {
    UserAttributeSimilarity,
    MinimumLength { min_length: usize },
    CommonPassword,
    NumericPassword,
}

impl PasswordValidator {
    pub fn default_set() -> Vec<Self> {
        vec![
            Self::UserAttributeSimilarity,
            Self::MinimumLength { min_length: 8 },
            Self::CommonPassword,
            Self::NumericPassword,
        ]
    }
}

/// Language and time-zone settings.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Localization {
    pub language_code: String,
    pub time_zone: String,
    pub use_i18n: bool,
    pub use_tz: bool,
}

impl Default for Localization {
    fn default() -> Self {
        Self {
            language_code: "en-us".to_string(),
            time_zone: "UTC".to_string(),
            use_i18n: true,
            use_tz: true,
        }
    }
}
