//! Argument compiler: settings in, engine command line out
//!
//! The engine parses its arguments positionally and in order, so the sequence
//! produced here is part of the compatibility contract:
//!
//! ```text
//! argv0  safety/batch  [quiet]  device  pages  size  [resolution]
//!        [password]  [threads]  [max bitmap]  device extras  output  inputs...
//! ```
//!
//! Compilation is pure and never touches the engine.

use crate::error::ValidationError;
use crate::settings::{ConversionSettings, Device, PageRange, PaperSize, ResolvedSize};

/// Placeholder for `argv[0]`, which the engine ignores
pub const DEFAULT_PROGRAM_NAME: &str = "gsdrive";

/// Restricted, non-interactive batch operation
pub const SAFETY_ARGS: &[&str] = &["-dPARANOIDSAFER", "-dBATCH", "-dNOPAUSE", "-dNOPROMPT"];

pub const QUIET_ARGS: &[&str] = &["-q", "-dQUIET"];

/// Check the settings for everything the compiler needs.
pub fn validate(settings: &ConversionSettings) -> Result<(), ValidationError> {
    if settings.device.is_none() {
        return Err(ValidationError::MissingDevice);
    }
    if let PageRange::Range { start, .. } = settings.pages {
        if start == 0 {
            return Err(ValidationError::InvalidPageRange { start });
        }
    }
    if settings.resolution.is_empty() {
        return Err(ValidationError::MissingResolution);
    }
    if settings.size.resolve().is_none() {
        return Err(ValidationError::MissingPageSize);
    }
    Ok(())
}

/// Compile validated settings into an argument vector using the default
/// program name placeholder.
pub fn compile<S: AsRef<str>>(
    settings: &ConversionSettings,
    output_path: &str,
    input_paths: &[S],
) -> Result<Vec<String>, ValidationError> {
    compile_with_program(DEFAULT_PROGRAM_NAME, settings, output_path, input_paths)
}

/// Compile validated settings into an argument vector with a custom `argv[0]`.
pub fn compile_with_program<S: AsRef<str>>(
    program_name: &str,
    settings: &ConversionSettings,
    output_path: &str,
    input_paths: &[S],
) -> Result<Vec<String>, ValidationError> {
    validate(settings)?;
    Ok(emit(program_name, settings, output_path, input_paths))
}

/// Legacy thumbnail path: raster JPEG output, a small fixed page size unless
/// explicit dimensions (in points) are given.
#[allow(clippy::too_many_arguments)]
pub fn compile_thumbnails(
    input_path: &str,
    output_path: &str,
    first_page: u32,
    last_page: u32,
    dpi_x: u32,
    dpi_y: u32,
    width: u32,
    height: u32,
) -> Result<Vec<String>, ValidationError> {
    let settings = thumbnail_settings(first_page, last_page, dpi_x, dpi_y, width, height);
    compile(&settings, output_path, &[input_path])
}

/// Settings used by the thumbnail entry points
pub fn thumbnail_settings(
    first_page: u32,
    last_page: u32,
    dpi_x: u32,
    dpi_y: u32,
    width: u32,
    height: u32,
) -> ConversionSettings {
    let settings = ConversionSettings::new(Device::Jpeg)
        .with_pages(PageRange::between(first_page, last_page))
        .with_resolution(dpi_x, dpi_y);
    if width == 0 && height == 0 {
        settings.with_paper(PaperSize::THUMBNAIL)
    } else {
        settings.with_manual_size(width, height)
    }
}

fn emit<S: AsRef<str>>(
    program_name: &str,
    settings: &ConversionSettings,
    output_path: &str,
    input_paths: &[S],
) -> Vec<String> {
    let mut args: Vec<String> = Vec::with_capacity(24 + input_paths.len());
    args.push(program_name.to_string());
    args.extend(SAFETY_ARGS.iter().map(|a| a.to_string()));

    if settings.quiet {
        args.extend(QUIET_ARGS.iter().map(|a| a.to_string()));
    }

    let device = settings.device.unwrap_or(Device::DEFAULT);
    args.push(format!("-sDEVICE={}", device));

    match settings.pages {
        PageRange::All => args.push("-dFirstPage=1".to_string()),
        PageRange::Range { start, end } => {
            args.push(format!("-dFirstPage={}", start));
            if end >= start {
                args.push(format!("-dLastPage={}", end));
            }
        }
    }

    match settings.size.resolve() {
        Some(ResolvedSize::Named(size)) => args.push(format!("-sPAPERSIZE={}", size)),
        Some(ResolvedSize::Manual(dims)) => {
            args.push(format!("-dDEVICEWIDTHPOINTS={}", dims.width));
            args.push(format!("-dDEVICEHEIGHTPOINTS={}", dims.height));
            args.push("-dFIXEDMEDIA".to_string());
            args.push("-dPDFFitPage".to_string());
        }
        // rejected by validate()
        None => args.push(format!("-sPAPERSIZE={}", PaperSize::DEFAULT)),
    }

    if !settings.resolution.is_empty() {
        args.push(format!("-dDEVICEXRESOLUTION={}", settings.resolution.width));
        args.push(format!("-dDEVICEYRESOLUTION={}", settings.resolution.height));
    }

    if let Some(password) = &settings.password {
        args.push(format!("-sPDFPassword={}", password));
    }

    let threads = settings.effective_rendering_threads();
    if threads > 1 {
        args.push(format!("-dNumRenderingThreads={}", threads));
    }
    if let Some(bytes) = settings.max_bitmap {
        args.push(format!("-dMaxBitmap={}", bytes));
    }

    args.extend(device.extra_args().iter().map(|a| a.to_string()));

    args.push(format!("-sOutputFile={}", output_path));
    args.extend(input_paths.iter().map(|p| p.as_ref().to_string()));
    args
}

/// Copy of `args` safe to log: the password value is masked
pub fn redacted(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|a| {
            if a.starts_with("-sPDFPassword=") {
                "-sPDFPassword=***".to_string()
            } else {
                a.clone()
            }
        })
        .collect()
}
