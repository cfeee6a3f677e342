use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use tybundle_core::sanitize_file_name;

use crate::{Error, Result, validate::validate_identifier};

/// A requested declaration: `path:TypeName` or `path:TypeName:Alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub file: PathBuf,
    pub type_name: String,
    pub alias: Option<String>,
}

impl EntryPoint {
    pub fn new(file: impl Into<PathBuf>, type_name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            type_name: type_name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// The name the entry is published under.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.type_name)
    }

    /// `{sanitized output name}.d.ts`
    pub fn output_file_name(&self) -> String {
        format!("{}.d.ts", sanitize_file_name(self.output_name()))
    }

    /// Resolve a relative entry file against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        if self.file.is_relative() {
            self.file = base.join(&self.file);
        }
        self
    }

    /// Check the type name and alias are usable declaration names.
    pub fn validate(&self) -> Result<()> {
        if let Some(reason) = validate_identifier(&self.type_name) {
            return Err(Error::invalid_identifier(&self.type_name, "type name", reason));
        }
        if let Some(alias) = &self.alias
            && let Some(reason) = validate_identifier(alias)
        {
            return Err(Error::invalid_identifier(alias, "alias", reason));
        }
        Ok(())
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.type_name)?;
        if let Some(alias) = &self.alias {
            write!(f, ":{}", alias)?;
        }
        Ok(())
    }
}

impl FromStr for EntryPoint {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();
        let (file, type_name, alias) = match parts.as_slice() {
            [file, type_name] => (*file, *type_name, None),
            [file, type_name, alias] => (*file, *type_name, Some(*alias)),
            _ => {
                return Err(Error::invalid_entry(
                    s,
                    format!("expected 2 or 3 ':'-separated parts, found {}", parts.len()),
                ));
            }
        };

        if file.is_empty() {
            return Err(Error::invalid_entry(s, "file path is empty"));
        }
        if type_name.is_empty() {
            return Err(Error::invalid_entry(s, "type name is empty"));
        }
        if alias.is_some_and(str::is_empty) {
            return Err(Error::invalid_entry(s, "alias is empty"));
        }

        let entry = Self {
            file: PathBuf::from(file),
            type_name: type_name.to_string(),
            alias: alias.map(str::to_string),
        };
        entry.validate()?;
        Ok(entry)
    }
}

/// Parse entry arguments, splitting each on commas. Every piece yields its
/// own result so one malformed entry does not hide the others.
pub fn parse_entries<I, S>(values: I) -> Vec<Result<EntryPoint>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .flat_map(|value| {
            value
                .as_ref()
                .split(',')
                .map(str::trim)
                .filter(|piece| !piece.is_empty())
                .map(EntryPoint::from_str)
                .collect::<Vec<_>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_two_parts() {
        let entry: EntryPoint = "src/user.ts:User".parse().unwrap();
        assert_eq!(entry.file, PathBuf::from("src/user.ts"));
        assert_eq!(entry.type_name, "User");
        assert_eq!(entry.alias, None);
        assert_eq!(entry.output_file_name(), "User.d.ts");
    }

    #[test]
    fn test_parse_with_alias() {
        let entry: EntryPoint = "src/user.ts:User:UserDTO".parse().unwrap();
        assert_eq!(entry.alias.as_deref(), Some("UserDTO"));
        assert_eq!(entry.output_name(), "UserDTO");
        assert_eq!(entry.output_file_name(), "UserDTO.d.ts");
        assert_eq!(entry.to_string(), "src/user.ts:User:UserDTO");
    }

    #[test]
    fn test_wrong_segment_count() {
        let err = "src/user.ts".parse::<EntryPoint>().unwrap_err();
        assert!(matches!(*err, Error::InvalidEntry { .. }));

        let err = "a.ts:B:C:D".parse::<EntryPoint>().unwrap_err();
        assert!(err.to_string().contains("found 4"));
    }

    #[test]
    fn test_empty_parts() {
        assert!("src/user.ts:".parse::<EntryPoint>().is_err());
        assert!(":User".parse::<EntryPoint>().is_err());
        assert!("src/user.ts:User:".parse::<EntryPoint>().is_err());
    }

    #[test]
    fn test_invalid_alias() {
        let err = "src/user.ts:User:user-dto".parse::<EntryPoint>().unwrap_err();
        assert!(matches!(*err, Error::InvalidIdentifier { .. }));
    }

    #[test]
    fn test_parse_entries_splits_commas_and_keeps_errors() {
        let results = parse_entries(["a.ts:A, b.ts:B:Bee", "bad", "c.ts:C,"]);
        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert_eq!(results[1].as_ref().unwrap().output_name(), "Bee");
        assert!(results[2].is_err());
        assert_eq!(results[3].as_ref().unwrap().type_name, "C");
    }

    #[test]
    fn test_relative_to() {
        let entry = EntryPoint::new("src/a.ts", "A").relative_to(Path::new("/proj"));
        assert_eq!(entry.file, PathBuf::from("/proj/src/a.ts"));

        let entry = EntryPoint::new("/abs/a.ts", "A").relative_to(Path::new("/proj"));
        assert_eq!(entry.file, PathBuf::from("/abs/a.ts"));
    }
}
