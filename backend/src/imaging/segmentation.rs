use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage, imageops::FilterType};

use super::ImagingError;
use super::classifier::{HttpSegmenter, Segment};

/// The classifier has a bounded input size; anything larger is scaled down
/// so the longer side lands exactly here.
const MAX_SEGMENT_DIM: u32 = 1024;

const FURNITURE_LABELS: [&str; 11] = [
    "table", "chair", "desk", "sofa", "bed", "cabinet", "shelf", "bench", "stool", "ottoman",
    "armchair",
];

/// Structural labels that are never a useful fallback subject.
const NON_OBJECT_LABELS: [&str; 4] = ["sky", "wall", "floor", "ceiling"];

/// Full pipeline: decode, downscale if needed, classify, union the furniture
/// masks and write them into the alpha channel. Returns PNG bytes.
pub async fn furniture_cutout(
    segmenter: &HttpSegmenter,
    data: &[u8],
) -> Result<Vec<u8>, ImagingError> {
    let img = image::load_from_memory(data).map_err(|e| ImagingError::Decode(e.to_string()))?;
    let img = shrink_for_segmentation(img);

    let mut source = Cursor::new(Vec::new());
    img.write_to(&mut source, ImageFormat::Png)
        .map_err(|e| ImagingError::Encode(e.to_string()))?;

    let segments = segmenter.segment(source.get_ref()).await?;
    let mask = furniture_mask(&segments, img.width(), img.height())?;
    let out = apply_alpha_mask(&img, &mask);

    let mut buf = Cursor::new(Vec::new());
    out.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| ImagingError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

pub fn shrink_for_segmentation(img: DynamicImage) -> DynamicImage {
    if img.width().max(img.height()) > MAX_SEGMENT_DIM {
        img.resize(MAX_SEGMENT_DIM, MAX_SEGMENT_DIM, FilterType::Triangle)
    } else {
        img
    }
}

fn is_furniture(label: &str) -> bool {
    let label = label.to_lowercase();
    FURNITURE_LABELS.iter().any(|term| label.contains(term))
}

fn is_non_object(label: &str) -> bool {
    let label = label.to_lowercase();
    NON_OBJECT_LABELS.iter().any(|term| label.contains(term))
}

/// Union all furniture-labelled masks via per-pixel maximum. When nothing
/// matched, fall back to the first segment that is not a structural label;
/// with no candidate at all the mask stays fully transparent.
pub fn furniture_mask(
    segments: &[Segment],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, ImagingError> {
    if segments.is_empty() {
        return Err(ImagingError::Classifier(
            "classifier returned no segments".into(),
        ));
    }

    let expected = (width as usize) * (height as usize);
    let matched: Vec<&Segment> = segments.iter().filter(|s| is_furniture(&s.label)).collect();

    let chosen: Vec<&Segment> = if matched.is_empty() {
        segments
            .iter()
            .find(|s| !is_non_object(&s.label))
            .into_iter()
            .collect()
    } else {
        matched
    };

    let mut mask = vec![0u8; expected];
    for segment in chosen {
        if segment.mask.len() != expected {
            return Err(ImagingError::Classifier(format!(
                "mask for '{}' has {} values, expected {}",
                segment.label,
                segment.mask.len(),
                expected
            )));
        }
        for (out, v) in mask.iter_mut().zip(&segment.mask) {
            *out = (*out).max(*v);
        }
    }

    Ok(mask)
}

pub fn apply_alpha_mask(img: &DynamicImage, mask: &[u8]) -> RgbaImage {
    let mut out = img.to_rgba8();
    for (px, alpha) in out.pixels_mut().zip(mask) {
        px.0[3] = *alpha;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn segment(label: &str, mask: Vec<u8>) -> Segment {
        Segment {
            label: label.to_string(),
            mask,
        }
    }

    #[test]
    fn shrink_only_above_limit() {
        let small = DynamicImage::new_rgba8(1024, 768);
        let kept = shrink_for_segmentation(small);
        assert_eq!((kept.width(), kept.height()), (1024, 768));

        let wide = DynamicImage::new_rgba8(2048, 1024);
        let scaled = shrink_for_segmentation(wide);
        assert_eq!((scaled.width(), scaled.height()), (1024, 512));

        let tall = DynamicImage::new_rgba8(1000, 2000);
        let scaled = shrink_for_segmentation(tall);
        assert_eq!((scaled.width(), scaled.height()), (512, 1024));
    }

    #[test]
    fn furniture_match_is_case_insensitive_substring() {
        let segments = vec![
            segment("Dining Table", vec![10, 0, 0, 0]),
            segment("ARMCHAIR (left)", vec![0, 20, 0, 0]),
            segment("wall", vec![99, 99, 99, 99]),
        ];
        let mask = furniture_mask(&segments, 2, 2).unwrap();
        assert_eq!(mask, vec![10, 20, 0, 0]);
    }

    #[test]
    fn union_is_pixelwise_maximum() {
        let segments = vec![
            segment("chair", vec![50, 200, 0, 10]),
            segment("sofa", vec![60, 100, 255, 5]),
        ];
        let mask = furniture_mask(&segments, 2, 2).unwrap();
        assert_eq!(mask, vec![60, 200, 255, 10]);
    }

    #[test]
    fn falls_back_to_first_non_structural_segment() {
        let segments = vec![
            segment("wall", vec![255; 4]),
            segment("floor lamp", vec![255; 4]),
            segment("plant", vec![1, 2, 3, 4]),
        ];
        // "floor lamp" contains "floor", so "plant" is the fallback
        let mask = furniture_mask(&segments, 2, 2).unwrap();
        assert_eq!(mask, vec![1, 2, 3, 4]);
    }

    #[test]
    fn all_structural_means_fully_transparent() {
        let segments = vec![segment("sky", vec![255; 4]), segment("wall", vec![255; 4])];
        let mask = furniture_mask(&segments, 2, 2).unwrap();
        assert_eq!(mask, vec![0; 4]);
    }

    #[test]
    fn empty_result_is_a_classifier_error() {
        let err = furniture_mask(&[], 2, 2).unwrap_err();
        assert!(matches!(err, ImagingError::Classifier(_)));
    }

    #[test]
    fn wrong_mask_length_is_a_classifier_error() {
        let segments = vec![segment("chair", vec![1, 2, 3])];
        let err = furniture_mask(&segments, 2, 2).unwrap_err();
        assert!(matches!(err, ImagingError::Classifier(_)));
    }

    #[test]
    fn mask_becomes_alpha_rgb_untouched() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 1, Rgba([9, 8, 7, 255])));
        let out = apply_alpha_mask(&img, &[0, 123]);
        assert_eq!(out.get_pixel(0, 0).0, [9, 8, 7, 0]);
        assert_eq!(out.get_pixel(1, 0).0, [9, 8, 7, 123]);
    }
}
