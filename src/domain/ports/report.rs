use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{errors::DomainError, SynthesizedResponse};

/// Writes a synthesized answer out as a paginated document.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, response: &SynthesizedResponse, sink: &mut dyn Write)
        -> Result<(), DomainError>;

    fn render_to_file(&self, response: &SynthesizedResponse, path: &Path) -> Result<(), DomainError> {
        let file = File::create(path)
            .map_err(|e| DomainError::report(format!("{}: {e}", path.display())))?;
        let mut writer = BufWriter::new(file);
        self.render(response, &mut writer)?;
        writer
            .flush()
            .map_err(|e| DomainError::report(format!("{}: {e}", path.display())))
    }
}
