//! # Project Registration
//!
//! A registration request is a JSON object:
//!
//! ```json
//! {
//!   "name": "Sample-Proj",
//!   "description": "This is a sample project",
//!   "owner": "Jane Doe",
//!   "owner-email": "jane@example.com",
//!   "programming-lang": "python",
//!   "tags": ["python", "sample", "project"]
//! }
//! ```
//!
//! Registering a name that already exists under any casing returns the
//! existing project's unique key instead of creating a second project.

use std::fs;
use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::metadata::{MetadataStore, ProjectFields};
use crate::validation::validate_project_name;

const REQUIRED_FIELDS: [&str; 5] = [
    "name",
    "description",
    "owner",
    "owner-email",
    "programming-lang",
];

/// A validated registration request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub description: String,
    pub owner: String,
    #[serde(rename = "owner-email")]
    pub owner_email: String,
    #[serde(rename = "programming-lang")]
    pub programming_lang: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RegisterRequest {
    /// Check a raw JSON payload, collecting every problem found.
    pub fn from_json(payload: &Value) -> StoreResult<Self> {
        let Some(object) = payload.as_object() else {
            return Err(StoreError::InvalidRequest(vec![
                "Registration payload must be a JSON object!".to_string(),
            ]));
        };

        let mut errors = Vec::new();
        for field in REQUIRED_FIELDS {
            match object.get(field) {
                None => errors.push(format!("Project '{field}' is required!")),
                Some(Value::String(_)) => {}
                Some(_) => errors.push(format!("Project '{field}' must be a string!")),
            }
        }

        if let Some(tags) = object.get("tags") {
            let all_strings = tags
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string));
            if !all_strings {
                errors.push("Project 'tags' must be a list!".to_string());
            }
        }

        if !errors.is_empty() {
            return Err(StoreError::InvalidRequest(errors));
        }

        Ok(serde_json::from_value(payload.clone())?)
    }

    pub fn fields(&self) -> ProjectFields {
        ProjectFields {
            name: self.name.clone(),
            description: self.description.clone(),
            owner: self.owner.clone(),
            owner_email: self.owner_email.clone(),
            programming_lang: self.programming_lang.clone(),
            tags: self.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationOutcome {
    pub project: String,
    #[serde(rename = "unique-key")]
    pub unique_key: String,
    pub already_existed: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ProjectRegistrar {
    metadata: MetadataStore,
}

impl ProjectRegistrar {
    pub fn new(metadata: MetadataStore) -> Self {
        Self { metadata }
    }

    /// Register a project, or return the key of the one already holding its name.
    pub fn register(&self, request: &RegisterRequest) -> StoreResult<RegistrationOutcome> {
        let name = validate_project_name(&request.name)?;
        fs::create_dir_all(self.metadata.root())?;

        let dir_name = match self.find_existing(name)? {
            Some(existing) => existing,
            None => {
                match fs::create_dir(self.metadata.project_dir(name)) {
                    Ok(()) => debug!(project = %name, "Created project directory"),
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                    Err(e) => return Err(e.into()),
                }
                name.to_string()
            }
        };

        match self.metadata.initialize(&dir_name, &request.fields()) {
            Ok(unique_key) => {
                info!(project = %dir_name, "Project registered");
                Ok(RegistrationOutcome {
                    project: request.name.clone(),
                    unique_key,
                    already_existed: false,
                    message: "project registered successfully!".to_string(),
                })
            }
            Err(StoreError::AlreadyExists { .. }) => {
                let existing = self.metadata.read(&dir_name)?;
                info!(project = %dir_name, requested = %name, "Project already registered");
                Ok(RegistrationOutcome {
                    project: request.name.clone(),
                    unique_key: existing.unique_key,
                    already_existed: true,
                    message: format!("project ['{}'] already registered!", name.to_lowercase()),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Directory under the root whose name equals `name` ignoring case.
    fn find_existing(&self, name: &str) -> StoreResult<Option<String>> {
        let wanted = name.to_lowercase();
        for entry in fs::read_dir(self.metadata.root())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().into_owned();
            if !dir_name.starts_with('.') && dir_name.to_lowercase() == wanted {
                return Ok(Some(dir_name));
            }
        }
        Ok(None)
    }
}
