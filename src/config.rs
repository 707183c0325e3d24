//! Configuration types for LaTeX-to-MDX conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across chapters and to diff two runs to
//! understand why their outputs differ.

use crate::converter::FormatConverter;
use crate::error::ConvertError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a LaTeX-to-MDX conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use tex2mdx::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .density(200)
///     .include_frontmatter(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Source dialect name handed to the format converter. Default: "latex".
    pub source_format: String,

    /// Root of the public asset tree. Rendered diagrams land in
    /// `<public_dir>/figures/<chapter>/`. Default: `public`.
    pub public_dir: PathBuf,

    /// Document compiler used for standalone diagram documents. Default: `pdflatex`.
    pub latex_command: String,

    /// Rasteriser turning the compiled PDF into a PNG. Default: `magick`.
    pub raster_command: String,

    /// Rasterisation density in DPI. Range: 72–600. Default: 300.
    ///
    /// 300 DPI keeps TikZ line art crisp on high-DPI displays while the PNGs
    /// stay small enough to serve without further processing.
    pub density: u32,

    /// PNG quality passed to the rasteriser. Range: 1–100. Default: 90.
    pub quality: u32,

    /// Converter binary used when no [`Self::converter`] is injected. Default: `pandoc`.
    pub pandoc_command: String,

    /// Pre-constructed format converter. Takes precedence over
    /// [`Self::pandoc_command`]; the test seam for running the pipeline
    /// without a pandoc installation.
    pub converter: Option<Arc<dyn FormatConverter>>,

    /// Prepend a YAML frontmatter block (`title`/`description`). Default: false.
    ///
    /// Frontmatter is an explicit, independent stage rather than a pipeline
    /// fork; the primary pipeline emits none.
    pub include_frontmatter: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            source_format: "latex".to_string(),
            public_dir: PathBuf::from("public"),
            latex_command: "pdflatex".to_string(),
            raster_command: "magick".to_string(),
            density: 300,
            quality: 90,
            pandoc_command: "pandoc".to_string(),
            converter: None,
            include_frontmatter: false,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("source_format", &self.source_format)
            .field("public_dir", &self.public_dir)
            .field("latex_command", &self.latex_command)
            .field("raster_command", &self.raster_command)
            .field("density", &self.density)
            .field("quality", &self.quality)
            .field("pandoc_command", &self.pandoc_command)
            .field("converter", &self.converter.as_ref().map(|_| "<dyn FormatConverter>"))
            .field("include_frontmatter", &self.include_frontmatter)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn source_format(mut self, format: impl Into<String>) -> Self {
        self.config.source_format = format.into();
        self
    }

    pub fn public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.public_dir = dir.into();
        self
    }

    pub fn latex_command(mut self, cmd: impl Into<String>) -> Self {
        self.config.latex_command = cmd.into();
        self
    }

    pub fn raster_command(mut self, cmd: impl Into<String>) -> Self {
        self.config.raster_command = cmd.into();
        self
    }

    pub fn density(mut self, dpi: u32) -> Self {
        self.config.density = dpi;
        self
    }

    pub fn quality(mut self, q: u32) -> Self {
        self.config.quality = q;
        self
    }

    pub fn pandoc_command(mut self, cmd: impl Into<String>) -> Self {
        self.config.pandoc_command = cmd.into();
        self
    }

    pub fn converter(mut self, converter: Arc<dyn FormatConverter>) -> Self {
        self.config.converter = Some(converter);
        self
    }

    pub fn include_frontmatter(mut self, v: bool) -> Self {
        self.config.include_frontmatter = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.density < 72 || c.density > 600 {
            return Err(ConvertError::InvalidConfig(format!(
                "density must be 72–600 DPI, got {}",
                c.density
            )));
        }
        if c.quality == 0 || c.quality > 100 {
            return Err(ConvertError::InvalidConfig(format!(
                "quality must be 1–100, got {}",
                c.quality
            )));
        }
        if c.source_format.is_empty() {
            return Err(ConvertError::InvalidConfig(
                "source_format must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
