use std::time::Duration;

use speedy_core::DEFAULT_ARCHIVE_NAME;
use speedy_engine::{ArchiveOptions, ConversionSettings, DEFAULT_JOB_TIMEOUT, DEFAULT_QUALITY};

use crate::SessionError;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Encoder quality, 0.0..=1.0.
    pub quality: f32,
    /// Upper bound for a single conversion; `None` disables it.
    pub job_timeout: Option<Duration>,
    pub archive_file_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            job_timeout: Some(DEFAULT_JOB_TIMEOUT),
            archive_file_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(SessionError::InvalidConfig(format!(
                "quality must be within 0.0..=1.0, got {}",
                self.quality
            )));
        }
        if self.job_timeout.is_some_and(|t| t.is_zero()) {
            return Err(SessionError::InvalidConfig(
                "job timeout must be positive".to_string(),
            ));
        }
        if self.archive_file_name.trim().is_empty()
            || self.archive_file_name.contains(&['/', '\\'][..])
        {
            return Err(SessionError::InvalidConfig(format!(
                "invalid archive file name {:?}",
                self.archive_file_name
            )));
        }
        Ok(())
    }

    pub fn conversion_settings(&self) -> ConversionSettings {
        ConversionSettings {
            quality: self.quality,
            timeout: self.job_timeout,
        }
    }

    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            file_name: self.archive_file_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::SessionConfig;

    #[test]
    fn defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.archive_file_name, "WebP_Speedy_Images.zip");
        assert!((config.quality - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn out_of_range_quality_is_rejected() {
        for quality in [-0.1, 1.5, f32::NAN] {
            let config = SessionConfig {
                quality,
                ..SessionConfig::default()
            };
            assert!(config.validate().is_err(), "{quality}");
        }
    }

    #[test]
    fn zero_timeout_and_path_like_archive_names_are_rejected() {
        let zero = SessionConfig {
            job_timeout: Some(Duration::ZERO),
            ..SessionConfig::default()
        };
        assert!(zero.validate().is_err());

        let nested = SessionConfig {
            archive_file_name: "out/bundle.zip".to_string(),
            ..SessionConfig::default()
        };
        assert!(nested.validate().is_err());

        let unbounded = SessionConfig {
            job_timeout: None,
            ..SessionConfig::default()
        };
        assert!(unbounded.validate().is_ok());
    }
}
