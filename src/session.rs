/// Instructor identity for report headers, passed explicitly instead of read
/// from ambient storage at render time.
#[derive(Debug, Clone)]
pub struct Session {
    pub instructor_full_name: String,
}

impl Session {
    /// A `--instructor` flag wins over the ATTENDANCE_INSTRUCTOR environment
    /// variable; callers fall back to the class header when both are absent.
    pub fn resolve(explicit: Option<String>) -> Option<Session> {
        explicit
            .or_else(|| std::env::var("ATTENDANCE_INSTRUCTOR").ok())
            .map(|instructor_full_name| Session {
                instructor_full_name,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_name_wins() {
        let session = Session::resolve(Some("Maria Santos".to_string())).unwrap();
        assert_eq!(session.instructor_full_name, "Maria Santos");
    }
}
