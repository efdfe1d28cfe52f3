//! Output devices understood by the engine

named_enum! {
    /// Output format/backend selector passed as `-sDEVICE=`
    pub enum Device {
        Png16m => "png16m",
        PngGray => "pnggray",
        Png256 => "png256",
        Png16 => "png16",
        PngMono => "pngmono",
        PngAlpha => "pngalpha",
        Jpeg => "jpeg",
        JpegGray => "jpeggray",
        TiffGray => "tiffgray",
        Tiff12nc => "tiff12nc",
        Tiff24nc => "tiff24nc",
        Tiff32nc => "tiff32nc",
        TiffSep => "tiffsep",
        TiffCrle => "tiffcrle",
        TiffG3 => "tiffg3",
        TiffG32d => "tiffg32d",
        TiffG4 => "tiffg4",
        TiffLzw => "tifflzw",
        TiffPack => "tiffpack",
        FaxG3 => "faxg3",
        FaxG32d => "faxg32d",
        FaxG4 => "faxg4",
        BmpMono => "bmpmono",
        BmpGray => "bmpgray",
        BmpSep1 => "bmpsep1",
        BmpSep8 => "bmpsep8",
        Bmp16 => "bmp16",
        Bmp256 => "bmp256",
        Bmp16m => "bmp16m",
        Bmp32b => "bmp32b",
        PcxMono => "pcxmono",
        PcxGray => "pcxgray",
        Pcx16 => "pcx16",
        Pcx256 => "pcx256",
        Pcx24b => "pcx24b",
        PcxCmyk => "pcxcmyk",
        PsdCmyk => "psdcmyk",
        PsdRgb => "psdrgb",
        PdfWrite => "pdfwrite",
        PsWrite => "pswrite",
        EpsWrite => "epswrite",
        PxlMono => "pxlmono",
        PxlColor => "pxlcolor",
    }
}

const ANTI_ALIAS_ARGS: &[&str] = &[
    "-dAlignToPixels=0",
    "-dGridFitTT=0",
    "-dTextAlphaBits=4",
    "-dGraphicsAlphaBits=4",
];

impl Device {
    /// Used when the argument compiler is handed no device at all
    pub const DEFAULT: Device = Device::PdfWrite;

    /// Extra flags appended after the request-specific ones
    pub fn extra_args(self) -> &'static [&'static str] {
        match self {
            Device::Jpeg
            | Device::JpegGray
            | Device::Png16m
            | Device::PngGray
            | Device::Png256
            | Device::Png16
            | Device::PngAlpha => ANTI_ALIAS_ARGS,
            _ => &[],
        }
    }
}
