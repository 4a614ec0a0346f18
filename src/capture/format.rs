//! Native format descriptors and the subtype negotiation used at stream setup

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::frame::{PixelEncoding, SensorKind};

/// Media subtype advertised by a frame source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Subtype {
    Bgra8,
    Nv12,
    Yuy2,
    Mjpg,
    D16,
    L8,
    L16,
    Other(String),
}

impl Subtype {
    pub fn as_str(&self) -> &str {
        match self {
            Subtype::Bgra8 => "BGRA8",
            Subtype::Nv12 => "NV12",
            Subtype::Yuy2 => "YUY2",
            Subtype::Mjpg => "MJPG",
            Subtype::D16 => "D16",
            Subtype::L8 => "L8",
            Subtype::L16 => "L16",
            Subtype::Other(name) => name,
        }
    }
}

impl FromStr for Subtype {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let known = [
            Subtype::Bgra8,
            Subtype::Nv12,
            Subtype::Yuy2,
            Subtype::Mjpg,
            Subtype::D16,
            Subtype::L8,
            Subtype::L16,
        ];
        Ok(known
            .into_iter()
            .find(|subtype| subtype.as_str().eq_ignore_ascii_case(s))
            .unwrap_or_else(|| Subtype::Other(s.to_string())))
    }
}

impl From<String> for Subtype {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(subtype) => subtype,
            Err(never) => match never {},
        }
    }
}

impl From<Subtype> for String {
    fn from(subtype: Subtype) -> Self {
        subtype.as_str().to_string()
    }
}

impl fmt::Display for Subtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format a frame source can be switched to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameFormat {
    pub subtype: Subtype,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl FrameFormat {
    pub fn new(subtype: Subtype, width: u32, height: u32, fps: u32) -> Self {
        Self {
            subtype,
            width,
            height,
            fps,
        }
    }
}

/// Encoding to request from the capture layer so the pipeline can render the
/// stream, or `None` when the source should not be opened at all.
///
/// Color sources are always asked for BGRA8 and left to the capture layer to
/// convert. Depth and infrared sources are only renderable in their native
/// single-channel layouts.
pub fn negotiate_encoding(kind: SensorKind, native: &FrameFormat) -> Option<PixelEncoding> {
    match kind {
        SensorKind::Color => Some(PixelEncoding::Bgra8),
        SensorKind::Depth => match native.subtype {
            Subtype::D16 => Some(PixelEncoding::Depth16),
            _ => None,
        },
        SensorKind::Infrared => match native.subtype {
            Subtype::L8 => Some(PixelEncoding::Gray8),
            Subtype::L16 => Some(PixelEncoding::Gray16),
            _ => None,
        },
    }
}

/// Native formats of a source that negotiation accepts
pub fn renderable_formats(
    kind: SensorKind,
    formats: &[FrameFormat],
) -> impl Iterator<Item = &FrameFormat> {
    formats
        .iter()
        .filter(move |format| negotiate_encoding(kind, format).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(subtype: &str) -> FrameFormat {
        FrameFormat::new(subtype.parse().unwrap(), 640, 480, 30)
    }

    #[test]
    fn subtype_parsing_ignores_case() {
        assert_eq!("d16".parse::<Subtype>().unwrap(), Subtype::D16);
        assert_eq!("Bgra8".parse::<Subtype>().unwrap(), Subtype::Bgra8);
        assert_eq!(
            "P010".parse::<Subtype>().unwrap(),
            Subtype::Other("P010".to_string())
        );
    }

    #[test]
    fn color_always_requests_bgra() {
        assert_eq!(
            negotiate_encoding(SensorKind::Color, &format("NV12")),
            Some(PixelEncoding::Bgra8)
        );
        assert_eq!(
            negotiate_encoding(SensorKind::Color, &format("MJPG")),
            Some(PixelEncoding::Bgra8)
        );
    }

    #[test]
    fn depth_requires_d16() {
        assert_eq!(
            negotiate_encoding(SensorKind::Depth, &format("D16")),
            Some(PixelEncoding::Depth16)
        );
        assert_eq!(negotiate_encoding(SensorKind::Depth, &format("L16")), None);
    }

    #[test]
    fn infrared_accepts_l8_and_l16_only() {
        assert_eq!(
            negotiate_encoding(SensorKind::Infrared, &format("l8")),
            Some(PixelEncoding::Gray8)
        );
        assert_eq!(
            negotiate_encoding(SensorKind::Infrared, &format("L16")),
            Some(PixelEncoding::Gray16)
        );
        assert_eq!(negotiate_encoding(SensorKind::Infrared, &format("YUY2")), None);
    }

    #[test]
    fn renderable_formats_filters_unsupported() {
        let formats = vec![format("NV12"), format("L8"), format("D16"), format("L16")];
        let renderable: Vec<_> = renderable_formats(SensorKind::Infrared, &formats)
            .map(|f| f.subtype.clone())
            .collect();
        assert_eq!(renderable, vec![Subtype::L8, Subtype::L16]);
    }
}
