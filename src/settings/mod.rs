//! Conversion settings: device, pages, size, resolution and engine hints
//!
//! A `ConversionSettings` value is built per call and handed by reference to
//! the argument compiler. Convenience entry points construct fresh values with
//! the `with_*` builders instead of mutating shared state.

/// Declares a fieldless enum whose variants map one-to-one onto engine names,
/// with `Display`, `FromStr` and string-based serde support.
macro_rules! named_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $text:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every known value, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// The name the engine expects on its command line
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::Error::ConfigError(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub mod device;
pub mod paper;

pub use device::Device;
pub use paper::PaperSize;

use serde::{Deserialize, Serialize};

/// Width and height pair, used for resolutions (dpi) and manual page sizes (points)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A 0x0 pair means "not set"
    pub fn is_empty(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

/// Output resolution in dots per inch
pub type Resolution = Dimensions;

/// Which pages of the input to process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRange {
    #[default]
    All,
    /// `start..=end`; when `end < start` the range is open-ended from `start`
    Range { start: u32, end: u32 },
}

impl PageRange {
    pub fn single(page: u32) -> Self {
        PageRange::Range { start: page, end: page }
    }

    pub fn between(start: u32, end: u32) -> Self {
        PageRange::Range { start, end }
    }

    /// Every page from `start` to the end of the document
    pub fn starting_at(start: u32) -> Self {
        PageRange::Range { start, end: 0 }
    }
}

/// Page size selection. A named size takes priority over manual dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSize {
    pub named: Option<PaperSize>,
    /// Manual size in points, used only when `named` is `None`
    pub manual: Dimensions,
}

/// The page size that will actually be emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedSize {
    Named(PaperSize),
    Manual(Dimensions),
}

impl PageSize {
    pub fn named(size: PaperSize) -> Self {
        Self {
            named: Some(size),
            manual: Dimensions::default(),
        }
    }

    pub fn manual(width: u32, height: u32) -> Self {
        Self {
            named: None,
            manual: Dimensions::new(width, height),
        }
    }

    pub fn resolve(&self) -> Option<ResolvedSize> {
        match self.named {
            Some(size) => Some(ResolvedSize::Named(size)),
            None if !self.manual.is_empty() => Some(ResolvedSize::Manual(self.manual)),
            None => None,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::named(PaperSize::DEFAULT)
    }
}

/// A single conversion request
///
/// The defaults are: no device (must be chosen), all pages, A4, no resolution
/// (must be chosen), quiet, and one rendering thread per logical core.
///
/// # Examples
///
/// ```
/// use gsdrive::{ConversionSettings, Device, PageRange};
///
/// let settings = ConversionSettings::new(Device::Jpeg)
///     .with_pages(PageRange::between(2, 4))
///     .with_resolution(300, 300);
/// assert_eq!(settings.device, Some(Device::Jpeg));
/// assert!(settings.quiet);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    /// Output device; `None` is rejected by the argument compiler
    pub device: Option<Device>,
    pub pages: PageRange,
    pub size: PageSize,
    pub resolution: Resolution,
    /// Password for encrypted PDF input
    pub password: Option<String>,
    /// Suppress the engine's informational output
    pub quiet: bool,
    /// Rendering thread hint; `None` means one per logical core
    pub rendering_threads: Option<usize>,
    /// Maximum bitmap size in bytes before the engine switches to banding
    pub max_bitmap: Option<u64>,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            device: None,
            pages: PageRange::All,
            size: PageSize::default(),
            resolution: Resolution::default(),
            password: None,
            quiet: true,
            rendering_threads: None,
            max_bitmap: None,
        }
    }
}

impl ConversionSettings {
    pub fn new(device: Device) -> Self {
        Self {
            device: Some(device),
            ..Default::default()
        }
    }

    /// Parse settings from a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = Some(device);
        self
    }

    pub fn with_pages(mut self, pages: PageRange) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_paper(mut self, size: PaperSize) -> Self {
        self.size = PageSize::named(size);
        self
    }

    pub fn with_manual_size(mut self, width: u32, height: u32) -> Self {
        self.size = PageSize::manual(width, height);
        self
    }

    pub fn with_resolution(mut self, x: u32, y: u32) -> Self {
        self.resolution = Resolution::new(x, y);
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_rendering_threads(mut self, threads: usize) -> Self {
        self.rendering_threads = Some(threads);
        self
    }

    pub fn with_max_bitmap(mut self, bytes: u64) -> Self {
        self.max_bitmap = Some(bytes);
        self
    }

    /// The thread hint actually used: the configured value, or the number of
    /// logical cores, never less than one
    pub fn effective_rendering_threads(&self) -> usize {
        self.rendering_threads.unwrap_or_else(num_cpus::get).max(1)
    }
}
