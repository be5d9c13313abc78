//! Degrade ladder for thumbnails that are over the size ceiling.
//!
//! Each probe re-encodes the image as JPEG at a width and quality. A
//! probe that fits is accepted; otherwise width shrinks by the shrink
//! ratio and quality steps down to its floor. Once both the width is
//! under the minimum and the quality is at the floor, the ladder gives
//! up. Width only shrinks and quality never rises, so the number of
//! probes is bounded.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::RgbImage;
use tracing::debug;

use crate::util::Result;

use super::MAX_THUMB_BYTES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderPolicy {
  pub ceiling: usize,
  pub initial_quality: u8,
  pub quality_step: u8,
  pub quality_floor: u8,
  pub min_width: u32,
  /// New width as a percentage of the previous one
  pub shrink_percent: u32,
}

impl Default for LadderPolicy {
  fn default() -> Self {
    Self {
      ceiling: MAX_THUMB_BYTES,
      initial_quality: 80,
      quality_step: 10,
      quality_floor: 30,
      min_width: 200,
      shrink_percent: 70,
    }
  }
}

impl LadderPolicy {
  fn next_width(&self, width: u32) -> u32 {
    let shrunk = u64::from(width) * u64::from(self.shrink_percent) / 100;
    (shrunk as u32).max(1)
  }

  fn next_quality(&self, quality: u8) -> u8 {
    quality
      .saturating_sub(self.quality_step)
      .max(self.quality_floor)
  }

  fn exhausted(&self, width: u32, quality: u8) -> bool {
    width < self.min_width && quality <= self.quality_floor
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fitted {
  pub bytes: Vec<u8>,
  pub width: u32,
  pub quality: u8,
  pub probes: usize,
}

enum State {
  Probe { width: u32, quality: u8 },
  Degrade { width: u32, quality: u8 },
  Accept(Fitted),
  GiveUp,
}

/// Run the ladder starting from `width`. `encode` renders one probe at
/// the given width and quality; its errors abort the ladder.
pub fn descend<F>(
  policy: &LadderPolicy,
  width: u32,
  mut encode: F,
) -> Result<Option<Fitted>>
where
  F: FnMut(u32, u8) -> Result<Vec<u8>>,
{
  let mut probes = 0;
  let mut state = State::Probe {
    width: width.max(1),
    quality: policy.initial_quality,
  };

  loop {
    state = match state {
      State::Probe { width, quality } => {
        probes += 1;
        let bytes = encode(width, quality)?;
        debug!(width, quality, size = bytes.len(), "thumbnail probe");

        if bytes.len() <= policy.ceiling {
          State::Accept(Fitted {
            bytes,
            width,
            quality,
            probes,
          })
        } else if policy.exhausted(width, quality) {
          State::GiveUp
        } else {
          State::Degrade { width, quality }
        }
      }
      State::Degrade { width, quality } => State::Probe {
        width: policy.next_width(width),
        quality: policy.next_quality(quality),
      },
      State::Accept(fitted) => return Ok(Some(fitted)),
      State::GiveUp => return Ok(None),
    };
  }
}

/// Decode `raw` and walk the ladder with real JPEG encodes.
pub fn shrink(raw: &[u8], policy: &LadderPolicy) -> Result<Option<Fitted>> {
  let rgb = image::load_from_memory(raw)?.to_rgb8();
  debug!(
    width = rgb.width(),
    height = rgb.height(),
    "decoded oversized thumbnail"
  );

  descend(policy, rgb.width(), |width, quality| {
    encode_jpeg(&rgb, width, quality)
  })
}

fn encode_jpeg(rgb: &RgbImage, width: u32, quality: u8) -> Result<Vec<u8>> {
  let mut buf = Vec::new();
  let encoder = JpegEncoder::new_with_quality(&mut buf, quality);

  if width >= rgb.width() {
    rgb.write_with_encoder(encoder)?;
  } else {
    let height =
      u64::from(rgb.height()) * u64::from(width) / u64::from(rgb.width());
    let height = (height as u32).max(1);
    let resized =
      image::imageops::resize(rgb, width, height, FilterType::Triangle);
    resized.write_with_encoder(encoder)?;
  }

  Ok(buf)
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::util::Error;

  #[test]
  fn test_probe_sequence_until_give_up() {
    let mut seen = Vec::new();
    let result = descend(&LadderPolicy::default(), 1000, |width, quality| {
      seen.push((width, quality));
      Ok(vec![0; MAX_THUMB_BYTES + 1])
    })
    .unwrap();

    assert_eq!(result, None);
    assert_eq!(
      seen,
      vec![(1000, 80), (700, 70), (490, 60), (343, 50), (240, 40), (168, 30)]
    );
  }

  #[test]
  fn test_small_width_keeps_lowering_quality() {
    let mut seen = Vec::new();
    let result = descend(&LadderPolicy::default(), 150, |width, quality| {
      seen.push((width, quality));
      Ok(vec![0; MAX_THUMB_BYTES + 1])
    })
    .unwrap();

    assert_eq!(result, None);
    assert_eq!(
      seen,
      vec![(150, 80), (105, 70), (73, 60), (51, 50), (35, 40), (24, 30)]
    );
  }

  #[test]
  fn test_large_width_keeps_shrinking_at_floor() {
    let mut seen = Vec::new();
    descend(&LadderPolicy::default(), 4000, |width, quality| {
      seen.push((width, quality));
      Ok(vec![0; MAX_THUMB_BYTES + 1])
    })
    .unwrap();

    let last = *seen.last().unwrap();
    assert_eq!(last.1, 30);
    assert!(last.0 < 200);
    // quality reaches the floor long before width drops under 200
    assert!(seen.iter().filter(|(_, q)| *q == 30).count() > 1);
  }

  #[test]
  fn test_accepts_first_fitting_probe() {
    // size shrinks with area and quality
    let fitted = descend(&LadderPolicy::default(), 2000, |width, quality| {
      let size = (width as usize * width as usize / 3) * quality as usize / 80;
      Ok(vec![0; size])
    })
    .unwrap()
    .unwrap();

    assert_eq!((fitted.width, fitted.quality), (1400, 70));
    assert_eq!(fitted.probes, 2);
    assert!(fitted.bytes.len() <= MAX_THUMB_BYTES);
  }

  #[test]
  fn test_encode_error_aborts() {
    let result = descend(&LadderPolicy::default(), 1000, |_, _| {
      Err(Error::Message("boom".into()))
    });
    assert!(result.is_err());
  }

  #[test]
  fn test_shrink_real_image() {
    let source = RgbImage::from_fn(800, 600, |x, y| {
      image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x ^ y) % 256) as u8])
    });
    let mut png = Vec::new();
    source
      .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
      .unwrap();

    let policy = LadderPolicy {
      ceiling: 20_000,
      ..Default::default()
    };
    let fitted = shrink(&png, &policy).unwrap().unwrap();
    assert!(fitted.bytes.len() <= 20_000);

    let decoded = image::load_from_memory(&fitted.bytes).unwrap();
    assert_eq!(decoded.width(), fitted.width);
    assert_eq!(
      image::guess_format(&fitted.bytes).unwrap(),
      image::ImageFormat::Jpeg
    );
  }

  #[test]
  fn test_shrink_rejects_garbage() {
    assert!(shrink(b"definitely not an image", &Default::default()).is_err());
  }
}
