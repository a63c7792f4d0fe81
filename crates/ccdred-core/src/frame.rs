use ndarray::Array2;

/// A single CCD image frame.
/// Pixel data is f64 in detector units (ADU), shape = (height, width).
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, row-major.
    pub data: Array2<f64>,
    /// Header cards carried from the source file.
    pub header: Header,
}

impl Frame {
    pub fn new(data: Array2<f64>) -> Self {
        Self {
            data,
            header: Header::default(),
        }
    }

    pub fn with_header(data: Array2<f64>, header: Header) -> Self {
        Self { data, header }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len()
    }
}

/// Role of a frame in the reduction, derived from its filename.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Bias,
    Flat,
    Science,
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bias => write!(f, "bias"),
            Self::Flat => write!(f, "flat"),
            Self::Science => write!(f, "science"),
        }
    }
}

/// Ordered key/value metadata attached to a frame.
///
/// Keys follow FITS conventions (uppercase, max 8 chars) but the header
/// is treated as opaque by the numerical code: corrections carry it
/// through unchanged onto their output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    cards: Vec<(String, CardValue)>,
}

/// Value of a single header card.
#[derive(Clone, Debug, PartialEq)]
pub enum CardValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    /// Comment-only card (COMMENT/HISTORY or a bare keyword).
    None,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a card, replacing an existing one with the same key.
    pub fn set(&mut self, key: &str, value: CardValue) {
        let key = key.to_uppercase();
        if let Some(card) = self.cards.iter_mut().find(|(k, _)| *k == key) {
            card.1 = value;
        } else {
            self.cards.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&CardValue> {
        let key = key.to_uppercase();
        self.cards.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn get_real(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            CardValue::Real(v) => Some(*v),
            CardValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            CardValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            CardValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn remove(&mut self, key: &str) {
        let key = key.to_uppercase();
        self.cards.retain(|(k, _)| *k != key);
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Cards in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CardValue)> {
        self.cards.iter().map(|(k, v)| (k.as_str(), v))
    }
}
