//! Input validation rules

use crate::error::{CoreError, Result};

/// Names that would collide with platform routes or tooling
const RESERVED_PROJECT_NAMES: &[&str] = &[
	"admin",
	"api",
	"delta",
	"deltas",
	"file",
	"files",
	"job",
	"jobs",
	"member",
	"members",
	"owner",
	"project",
	"projects",
	"user",
	"users",
];

/// Validate a project name.
///
/// Rules: at least 3 characters, begins with a letter, contains only
/// letters, digits, underscores or hyphens, and is not a reserved word.
pub fn validate_project_name(name: &str) -> Result<()> {
	if name.chars().count() < 3 {
		return Err(CoreError::InvalidProjectName(format!(
			"'{}' must be at least 3 characters long",
			name
		)));
	}

	if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
		return Err(CoreError::InvalidProjectName(format!(
			"'{}' must begin with a letter",
			name
		)));
	}

	if let Some(bad) = name
		.chars()
		.find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
	{
		return Err(CoreError::InvalidProjectName(format!(
			"'{}' contains '{}'; only letters, numbers, underscores or hyphens are allowed",
			name, bad
		)));
	}

	if RESERVED_PROJECT_NAMES.contains(&name.to_ascii_lowercase().as_str()) {
		return Err(CoreError::InvalidProjectName(format!(
			"'{}' is a reserved word",
			name
		)));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_well_formed_names() {
		for name in ["survey-2025", "field_data", "Abc", "rivers-NE_03"] {
			assert!(validate_project_name(name).is_ok(), "{name}");
		}
	}

	#[test]
	fn rejects_short_names() {
		assert!(validate_project_name("ab").is_err());
		assert!(validate_project_name("").is_err());
	}

	#[test]
	fn rejects_names_not_starting_with_a_letter() {
		assert!(validate_project_name("1abc").is_err());
		assert!(validate_project_name("-abc").is_err());
		assert!(validate_project_name("_abc").is_err());
	}

	#[test]
	fn rejects_forbidden_characters() {
		assert!(validate_project_name("my project").is_err());
		assert!(validate_project_name("a/b/c").is_err());
		assert!(validate_project_name("naïve").is_err());
	}

	#[test]
	fn rejects_reserved_words_case_insensitively() {
		assert!(validate_project_name("projects").is_err());
		assert!(validate_project_name("Admin").is_err());
		assert!(validate_project_name("DELTAS").is_err());
	}
}
