//! Shared mock backend for CLI unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use playbill_source::{MockSource, TranscriptSource};

use crate::GeneratorBackend;

pub struct MockGeneratorBackend {
    pub source: Arc<MockSource>,
    pub files: HashMap<String, String>,
    pub base_url_missing: bool,
}

impl MockGeneratorBackend {
    pub fn new() -> Self {
        Self {
            source: Arc::new(MockSource::new()),
            files: HashMap::new(),
            base_url_missing: false,
        }
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.to_string());
        self
    }

    pub fn without_base_url(mut self) -> Self {
        self.base_url_missing = true;
        self
    }
}

impl GeneratorBackend for MockGeneratorBackend {
    fn read_file(&self, path: &str) -> Result<String, String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| format!("not found: {path}"))
    }

    fn base_url(&self) -> Result<String, String> {
        if self.base_url_missing {
            Err(format!("{} not set", crate::ENV_BASE_URL))
        } else {
            Ok("http://localhost:11434/v1".to_string())
        }
    }

    fn open_source(&self, _base_url: &str) -> Result<Arc<dyn TranscriptSource>, String> {
        let source: Arc<dyn TranscriptSource> = self.source.clone();
        Ok(source)
    }
}
