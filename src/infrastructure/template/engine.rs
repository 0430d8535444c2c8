// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::domain::config::Replacement;
use crate::domain::resource::ResourceDescriptor;
use crate::infrastructure::constants::RANDOM_ID_TOKEN;
use crate::shared::error::{DeployError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Supplies raw template text.
pub trait TemplateSource: Send + Sync {
    fn read(&self, path: &str) -> Result<String>;
}

/// Reads templates from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsTemplateSource;

impl TemplateSource for FsTemplateSource {
    fn read(&self, path: &str) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DeployError::TemplateNotFound {
                path: path.to_string(),
            },
            _ => DeployError::TemplateRead {
                path: path.to_string(),
                source: e,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTemplate {
    pub path: PathBuf,
    pub content: String,
}

impl RenderedTemplate {
    pub fn path_str(&self) -> String {
        self.path.display().to_string()
    }
}

/// Substitute every token of `map` from the descriptor, then give each
/// random-id token its own fresh UUID.
pub fn render(raw: &str, map: &[Replacement], descriptor: &ResourceDescriptor) -> String {
    let substituted = map.iter().fold(raw.to_string(), |text, entry| {
        let value = descriptor.attribute(&entry.attribute).unwrap_or_default();
        text.replace(&entry.token, &value)
    });

    inject_random_ids(&substituted)
}

fn inject_random_ids(text: &str) -> String {
    let mut parts = text.split(RANDOM_ID_TOKEN);
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        out.push_str(&Uuid::new_v4().to_string());
        out.push_str(part);
    }
    out
}

pub struct TemplateEngine {
    source: Arc<dyn TemplateSource>,
    destination: PathBuf,
}

impl TemplateEngine {
    pub fn new(source: Arc<dyn TemplateSource>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source,
            destination: destination.into(),
        }
    }

    /// Render a template and write it to the destination directory under its base name.
    pub fn render_file(
        &self,
        template_path: &str,
        map: &[Replacement],
        descriptor: &ResourceDescriptor,
    ) -> Result<RenderedTemplate> {
        let raw = self.source.read(template_path)?;
        let content = render(&raw, map, descriptor);

        let file_name = Path::new(template_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                DeployError::config_error(format!("Invalid template path: {}", template_path))
            })?;

        let path = self.write_artifact(&file_name, &content)?;
        debug!("Rendered {} into {}", template_path, path.display());

        Ok(RenderedTemplate { path, content })
    }

    /// Write an auxiliary file next to the rendered templates.
    pub fn write_artifact(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        let path = self.destination.join(file_name);
        let write_error = |source| DeployError::TemplateWrite {
            path: path.display().to_string(),
            source,
        };

        std::fs::create_dir_all(&self.destination).map_err(write_error)?;
        std::fs::write(&path, content).map_err(write_error)?;

        Ok(path)
    }
}
