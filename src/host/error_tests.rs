//! Unit tests for host error types

#[cfg(test)]
mod tests {
    use crate::host::error::HostError;
    use std::error::Error;

    #[test]
    fn test_not_found_display() {
        let error = HostError::NotFound("notes/a.md".to_string());
        assert_eq!(error.to_string(), "Not found: notes/a.md");
    }

    #[test]
    fn test_already_exists_display() {
        let error = HostError::AlreadyExists("a.md".to_string());
        assert_eq!(error.to_string(), "Already exists: a.md");
    }

    #[test]
    fn test_io_error_from() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: HostError = io_error.into();

        assert!(error.to_string().contains("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_yaml_error_from() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("a: [").unwrap_err();
        let error: HostError = yaml_error.into();

        assert!(error.to_string().starts_with("Front matter error"));
    }

    #[test]
    fn test_error_debug() {
        let error = HostError::Backend("offline".to_string());
        let debug = format!("{error:?}");
        assert!(debug.contains("Backend"));
        assert!(debug.contains("offline"));
    }
}
