//! One-call conversion from an input file to the integrator's initial
//! conditions

use std::path::{Path, PathBuf};

use log::info;

use super::{InputFormat, IntegratorHeader, ParsedElements, DEFAULT_OUTPUT};
use crate::planetlib::Ephemeris;
use crate::Result;

/// Parses, transforms and (optionally) saves elements
pub struct Converter<'a> {
    ephemeris: &'a dyn Ephemeris,
    header: IntegratorHeader,
    output: Option<PathBuf>,
}

impl<'a> Converter<'a> {
    /// A converter writing to `holman_ic` in the working directory
    pub fn new(ephemeris: &'a dyn Ephemeris) -> Self {
        Self {
            ephemeris,
            header: IntegratorHeader::default(),
            output: Some(PathBuf::from(DEFAULT_OUTPUT)),
        }
    }

    pub fn with_header(mut self, header: IntegratorHeader) -> Self {
        self.header = header;
        self
    }

    pub fn save_to<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Transform only, writing nothing
    pub fn without_saving(mut self) -> Self {
        self.output = None;
        self
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Run the whole pipeline on `input`
    pub fn convert<P: AsRef<Path>>(&self, input: P, format: InputFormat) -> Result<ParsedElements> {
        let input = input.as_ref();
        info!("Converting {} ({})", input.display(), format);
        let elements = ParsedElements::from_file(input, format, self.ephemeris)?;
        if let Some(output) = &self.output {
            elements.save_elements_with(output, &self.header)?;
        }
        Ok(elements)
    }
}
