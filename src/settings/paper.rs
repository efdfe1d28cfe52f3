//! Paper sizes known to the engine by name

named_enum! {
    /// Named paper size passed as `-sPAPERSIZE=`
    pub enum PaperSize {
        Tabloid => "11x17",
        Ledger => "ledger",
        Legal => "legal",
        Letter => "letter",
        LetterSmall => "lettersmall",
        ArchE => "archE",
        ArchD => "archD",
        ArchC => "archC",
        ArchB => "archB",
        ArchA => "archA",
        A0 => "a0",
        A1 => "a1",
        A2 => "a2",
        A3 => "a3",
        A4 => "a4",
        A4Small => "a4small",
        A5 => "a5",
        A6 => "a6",
        A7 => "a7",
        A8 => "a8",
        A9 => "a9",
        A10 => "a10",
        IsoB0 => "isob0",
        IsoB1 => "isob1",
        IsoB2 => "isob2",
        IsoB3 => "isob3",
        IsoB4 => "isob4",
        IsoB5 => "isob5",
        IsoB6 => "isob6",
        C0 => "c0",
        C1 => "c1",
        C2 => "c2",
        C3 => "c3",
        C4 => "c4",
        C5 => "c5",
        C6 => "c6",
        JisB0 => "jisb0",
        JisB1 => "jisb1",
        JisB2 => "jisb2",
        JisB3 => "jisb3",
        JisB4 => "jisb4",
        JisB5 => "jisb5",
        JisB6 => "jisb6",
        B0 => "b0",
        B1 => "b1",
        B2 => "b2",
        B3 => "b3",
        B4 => "b4",
        B5 => "b5",
        Flsa => "flsa",
        Flse => "flse",
        HalfLetter => "halfletter",
    }
}

impl PaperSize {
    /// Default size for new settings
    pub const DEFAULT: PaperSize = PaperSize::A4;

    /// Small fixed size used by thumbnail generation
    pub const THUMBNAIL: PaperSize = PaperSize::A7;
}
