use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NuisanceResult<T> = Result<T, NuisanceError>;
pub type ComputeResult<T> = NuisanceResult<T>;
pub type ConfigResult<T> = NuisanceResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NuisanceErrorCategory {
    Success,
    PhysicsConstraint,
    Configuration,
    NotImplemented,
    IoSystem,
    Internal,
}

impl NuisanceErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::PhysicsConstraint => 2,
            Self::Configuration => 3,
            Self::NotImplemented => 4,
            Self::IoSystem => 5,
            Self::Internal => 6,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::PhysicsConstraint => "PhysicsConstraintError",
            Self::Configuration => "ConfigurationError",
            Self::NotImplemented => "NotImplementedError",
            Self::IoSystem => "IoSystemError",
            Self::Internal => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

impl Display for NuisanceErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuisanceError {
    category: NuisanceErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl NuisanceError {
    pub fn new(
        category: NuisanceErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn physics_constraint(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(NuisanceErrorCategory::PhysicsConstraint, placeholder, message)
    }

    pub fn configuration(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(NuisanceErrorCategory::Configuration, placeholder, message)
    }

    pub fn not_implemented(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(NuisanceErrorCategory::NotImplemented, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(NuisanceErrorCategory::IoSystem, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(NuisanceErrorCategory::Internal, placeholder, message)
    }

    pub const fn category(&self) -> NuisanceErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for NuisanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for NuisanceError {}
