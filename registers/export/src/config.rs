// Licensed under the Apache-2.0 license

//! Options controlling the traversal and each emitter.
//!
//! Every options struct has builder-style setters so embedders can write
//! `HtmlOptions::default().title("SoC").heading_offset(2)`. The whole set can
//! also be loaded from a TOML file through [`ExportConfig`].
//!
//! # Example
//!
//! ```
//! use registers_export::config::{ExportConfig, HeaderDialect, IpxactStandard};
//!
//! let config = ExportConfig::from_toml_str(r#"
//!     skip_not_present = true
//!
//!     [ipxact]
//!     vendor = "acme.com"
//!     standard = "ieee-1685-2009"
//!
//!     [html]
//!     title = "ACME SoC"
//! "#).unwrap();
//! assert!(config.skip_not_present);
//! assert_eq!(config.ipxact.vendor, "acme.com");
//! assert_eq!(config.ipxact.standard, IpxactStandard::Ieee1685_2009);
//! assert_eq!(config.header.dialect, HeaderDialect::C);
//! ```

use crate::error::{ExportError, ExportResult};
use serde::Deserialize;
use std::path::Path;

/// How child nodes are enumerated during a walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Leave out nodes and fields whose `ispresent` property is false.
    pub skip_not_present: bool,
    /// Visit each element of an arrayed child separately.
    pub unroll: bool,
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_not_present(mut self, skip: bool) -> Self {
        self.skip_not_present = skip;
        self
    }

    pub fn unroll(mut self, unroll: bool) -> Self {
        self.unroll = unroll;
        self
    }
}

/// Directive style of a header file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderDialect {
    /// `#define`, for C and C++.
    #[default]
    C,
    /// `` `define ``, for Verilog and SystemVerilog.
    Verilog,
}

impl HeaderDialect {
    /// Directive prefix character.
    pub fn prefix(self) -> char {
        match self {
            HeaderDialect::C => '#',
            HeaderDialect::Verilog => '`',
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            HeaderDialect::C => "h",
            HeaderDialect::Verilog => "svh",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HeaderOptions {
    pub dialect: HeaderDialect,
    pub skip_not_present: bool,
}

impl HeaderOptions {
    pub fn dialect(mut self, dialect: HeaderDialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn skip_not_present(mut self, skip: bool) -> Self {
        self.skip_not_present = skip;
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UvmOptions {
    /// Package name; `<top>_reg_pkg` when unset.
    pub package: Option<String>,
    pub skip_not_present: bool,
}

impl UvmOptions {
    pub fn package(mut self, name: &str) -> Self {
        self.package = Some(name.to_string());
        self
    }

    pub fn skip_not_present(mut self, skip: bool) -> Self {
        self.skip_not_present = skip;
        self
    }
}

/// IP-XACT schema revision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum IpxactStandard {
    #[serde(rename = "ieee-1685-2009")]
    Ieee1685_2009,
    #[default]
    #[serde(rename = "ieee-1685-2014")]
    Ieee1685_2014,
}

impl IpxactStandard {
    /// Element name prefix.
    pub fn prefix(self) -> &'static str {
        match self {
            IpxactStandard::Ieee1685_2009 => "spirit",
            IpxactStandard::Ieee1685_2014 => "ipxact",
        }
    }

    pub fn namespace(self) -> &'static str {
        match self {
            IpxactStandard::Ieee1685_2009 => "http://www.spiritconsortium.org/XMLSchema/SPIRIT/1685-2009",
            IpxactStandard::Ieee1685_2014 => "http://www.accellera.org/XMLSchema/IPXACT/1685-2014",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IpxactOptions {
    pub vendor: String,
    pub library: String,
    pub version: String,
    pub standard: IpxactStandard,
    pub skip_not_present: bool,
}

impl Default for IpxactOptions {
    fn default() -> Self {
        Self {
            vendor: "example.org".to_string(),
            library: "mylibrary".to_string(),
            version: "1.0".to_string(),
            standard: IpxactStandard::default(),
            skip_not_present: false,
        }
    }
}

impl IpxactOptions {
    pub fn vendor(mut self, vendor: &str) -> Self {
        self.vendor = vendor.to_string();
        self
    }

    pub fn library(mut self, library: &str) -> Self {
        self.library = library.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn standard(mut self, standard: IpxactStandard) -> Self {
        self.standard = standard;
        self
    }

    pub fn skip_not_present(mut self, skip: bool) -> Self {
        self.skip_not_present = skip;
        self
    }
}

pub const DEFAULT_FOOTER: &str = "Generated by RALBot HTML";

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HtmlOptions {
    /// Page title; `<top name> Reference` when unset.
    pub title: Option<String>,
    pub footer: String,
    /// Optional link shown in the page header.
    pub home_url: Option<String>,
    /// Levels added to headings found in descriptions (capped at `h6`).
    pub heading_offset: u8,
    /// Skip nodes whose `ispresent` property is false. On by default since
    /// absent blocks have nothing to document.
    pub skip_not_present: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            title: None,
            footer: DEFAULT_FOOTER.to_string(),
            home_url: None,
            heading_offset: 1,
            skip_not_present: true,
        }
    }
}

impl HtmlOptions {
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn footer(mut self, footer: &str) -> Self {
        self.footer = footer.to_string();
        self
    }

    pub fn home_url(mut self, url: &str) -> Self {
        self.home_url = Some(url.to_string());
        self
    }

    pub fn heading_offset(mut self, offset: u8) -> Self {
        self.heading_offset = offset;
        self
    }

    pub fn skip_not_present(mut self, skip: bool) -> Self {
        self.skip_not_present = skip;
        self
    }
}

/// Options for every emitter, as read from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Applied on top of the per-emitter settings when true.
    pub skip_not_present: bool,
    pub header: HeaderOptions,
    pub uvm: UvmOptions,
    pub ipxact: IpxactOptions,
    pub html: HtmlOptions,
}

impl ExportConfig {
    pub fn from_toml_str(input: &str) -> ExportResult<Self> {
        let mut config: ExportConfig =
            toml::from_str(input).map_err(|e| ExportError::InvalidArgument(e.to_string()))?;
        if config.skip_not_present {
            config.header.skip_not_present = true;
            config.uvm.skip_not_present = true;
            config.ipxact.skip_not_present = true;
            config.html.skip_not_present = true;
        }
        Ok(config)
    }

    pub fn from_path(path: &Path) -> ExportResult<Self> {
        let input = std::fs::read_to_string(path).map_err(|e| ExportError::io(path, e))?;
        Self::from_toml_str(&input)
    }
}
