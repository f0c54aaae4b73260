//! Username derivation from CiviCRM contact values

use std::collections::{HashMap, HashSet};

use crate::types::{Contact, UsernameSource};

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl UsernameSource {
    /// Derive a username for `contact`, `None` when the chosen value is missing.
    ///
    /// `FirstAndLastName` renders as "Jane DOE": the last name is upper-cased
    /// and either part may be absent.
    pub fn username_for(&self, contact: &Contact) -> Option<String> {
        match self {
            UsernameSource::Email => non_empty(contact.email.as_ref()).map(str::to_string),
            UsernameSource::DisplayName => {
                non_empty(contact.display_name.as_ref()).map(str::to_string)
            }
            UsernameSource::FirstAndLastName => {
                let first = non_empty(contact.first_name.as_ref());
                let last = non_empty(contact.last_name.as_ref()).map(str::to_uppercase);
                match (first, last) {
                    (Some(first), Some(last)) => Some(format!("{first} {last}")),
                    (Some(first), None) => Some(first.to_string()),
                    (None, Some(last)) => Some(last),
                    (None, None) => None,
                }
            }
        }
    }
}

/// Hands out usernames that are unique, ignoring case, against a set of
/// names already in use.
///
/// A taken name gets a number appended, starting at 2. The next number to
/// try is remembered per base name.
#[derive(Debug, Clone, Default)]
pub struct UsernameAllocator {
    taken: HashSet<String>,
    next_suffix: HashMap<String, u32>,
}

impl UsernameAllocator {
    pub fn new<I, T>(taken: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            taken: taken
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
            next_suffix: HashMap::new(),
        }
    }

    /// Reserve and return a unique username derived from `base`
    pub fn allocate(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_lowercase()) {
            return base.to_string();
        }

        let key = base.to_lowercase();
        let mut counter = self.next_suffix.get(&key).copied().unwrap_or(2);
        loop {
            let candidate = format!("{base} {counter}");
            counter += 1;
            if self.taken.insert(candidate.to_lowercase()) {
                self.next_suffix.insert(key, counter);
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Contact {
        Contact::new(7)
            .with_email(" jane@example.org ")
            .with_display_name("Ms Jane Doe")
            .with_name("Jane", "Doe")
    }

    #[test]
    fn test_email_source() {
        assert_eq!(
            UsernameSource::Email.username_for(&jane()).as_deref(),
            Some("jane@example.org")
        );
    }

    #[test]
    fn test_display_name_source() {
        assert_eq!(
            UsernameSource::DisplayName.username_for(&jane()).as_deref(),
            Some("Ms Jane Doe")
        );
    }

    #[test]
    fn test_first_and_last_name_source() {
        assert_eq!(
            UsernameSource::FirstAndLastName
                .username_for(&jane())
                .as_deref(),
            Some("Jane DOE")
        );

        let last_only = Contact {
            first_name: Some("  ".to_string()),
            last_name: Some("Doe".to_string()),
            ..Contact::new(8)
        };
        assert_eq!(
            UsernameSource::FirstAndLastName
                .username_for(&last_only)
                .as_deref(),
            Some("DOE")
        );
    }

    #[test]
    fn test_missing_value() {
        assert_eq!(UsernameSource::Email.username_for(&Contact::new(1)), None);
        assert_eq!(
            UsernameSource::FirstAndLastName.username_for(&Contact::new(1)),
            None
        );
    }

    #[test]
    fn test_allocator_appends_counter() {
        let mut names = UsernameAllocator::new(["Jane DOE", "jane doe 2"]);
        assert_eq!(names.allocate("Jane DOE"), "Jane DOE 3");
        assert_eq!(names.allocate("JANE doe"), "JANE doe 4");
        assert_eq!(names.allocate("John DOE"), "John DOE");
        assert_eq!(names.allocate("John DOE"), "John DOE 2");
    }

    #[test]
    fn test_allocator_with_many_identical_names() {
        let mut names = UsernameAllocator::new(["John SMITH"]);
        let allocated: Vec<String> = (0..20_000).map(|_| names.allocate("John SMITH")).collect();

        assert_eq!(allocated[0], "John SMITH 2");
        assert_eq!(allocated[19_999], "John SMITH 20001");
        let unique: HashSet<&String> = allocated.iter().collect();
        assert_eq!(unique.len(), allocated.len());
    }
}
