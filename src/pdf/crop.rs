//! Crop composition via lopdf.
//!
//! The source document is loaded, the selected page's decoded content
//! streams are wrapped as a Form XObject carrying the page's inherited
//! MediaBox and Resources, and a new single page of the crop rectangle's
//! size invokes the XObject under a translation matrix. The page tree is
//! rewritten to hold only the new page, then unreferenced objects are
//! pruned before serialization.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use thiserror::Error;

/// Crop rectangle in top-left-origin pixel coordinates, as submitted by
/// the client. PDF's native origin is bottom-left; conversion happens in
/// [`crop_page`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Errors from loading or recomposing the source document.
#[derive(Debug, Error)]
pub enum CropError {
    #[error("page index {index} out of bounds for document with {count} pages")]
    PageOutOfBounds { index: i64, count: usize },

    #[error("page has no usable MediaBox")]
    MissingMediaBox,

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Convert a top-left-origin y coordinate to the bottom-left origin used
/// by PDF: the distance from the page bottom to the crop rectangle's
/// lower edge.
fn y_from_bottom(page_height: f32, y: f32, height: f32) -> f32 {
    page_height - y - height
}

/// Output page dimensions: rounded crop size, floored at 1x1.
fn output_size(rect: &CropRect) -> (i64, i64) {
    let w = (rect.width.round() as i64).max(1);
    let h = (rect.height.round() as i64).max(1);
    (w, h)
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Walk the page's Parent chain for an inheritable attribute
/// (MediaBox and Resources both inherit in the page tree).
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut id = page_id;
    loop {
        let dict = doc.get_dictionary(id).ok()?;
        if let Ok(obj) = dict.get(key) {
            return Some(obj);
        }
        id = dict.get(b"Parent").ok()?.as_reference().ok()?;
    }
}

/// Resolve the page's MediaBox to [x0, y0, x1, y1].
fn media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4], CropError> {
    let obj = inherited(doc, page_id, b"MediaBox").ok_or(CropError::MissingMediaBox)?;
    let arr = match obj {
        Object::Reference(id) => doc.get_object(*id)?.as_array()?,
        other => other.as_array()?,
    };
    if arr.len() != 4 {
        return Err(CropError::MissingMediaBox);
    }
    let mut rect = [0.0f32; 4];
    for (slot, obj) in rect.iter_mut().zip(arr) {
        *slot = number(obj).ok_or(CropError::MissingMediaBox)?;
    }
    Ok(rect)
}

/// Crop one page of `data` to `rect`, returning the serialized
/// single-page output document.
///
/// The embedded page is drawn at its full original size, shifted so that
/// only the crop rectangle lands on the output canvas; crop regions
/// outside the source page render blank.
pub fn crop_page(data: &[u8], page_index: i64, rect: CropRect) -> Result<Vec<u8>, CropError> {
    let mut doc = Document::load_mem(data)?;

    let pages = doc.get_pages();
    let count = pages.len();
    if page_index < 0 || page_index as usize >= count {
        return Err(CropError::PageOutOfBounds {
            index: page_index,
            count,
        });
    }
    let page_id = *pages
        .get(&(page_index as u32 + 1))
        .ok_or(CropError::PageOutOfBounds {
            index: page_index,
            count,
        })?;

    let [x0, y0, x1, y1] = media_box(&doc, page_id)?;
    let src_height = y1 - y0;

    // The page content as a Form XObject, reusing the page's resources.
    // Resources kept as a reference when the page stored one, cloned
    // inline otherwise.
    let resources = match inherited(&doc, page_id, b"Resources") {
        Some(Object::Reference(id)) => Object::Reference(*id),
        Some(Object::Dictionary(dict)) => Object::Dictionary(dict.clone()),
        _ => Object::Dictionary(Dictionary::new()),
    };
    let content = doc.get_page_content(page_id)?;
    let form_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "FormType" => 1,
            "BBox" => vec![x0.into(), y0.into(), x1.into(), y1.into()],
            "Resources" => resources,
        },
        content,
    ));

    // Shift so the crop rectangle's bottom-left corner lands at the
    // output origin. Content coordinates are relative to the MediaBox
    // origin, hence the extra x0/y0 terms.
    let tx = -rect.x - x0;
    let ty = -y_from_bottom(src_height, rect.y, rect.height) - y0;
    let operations = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    1.into(),
                    0.into(),
                    0.into(),
                    1.into(),
                    tx.into(),
                    ty.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Fm0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, operations.encode()?));

    let root_id = doc.trailer.get(b"Root")?.as_reference()?;
    let pages_id = doc.get_dictionary(root_id)?.get(b"Pages")?.as_reference()?;

    let (out_width, out_height) = output_size(&rect);
    let new_page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), out_width.into(), out_height.into()],
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Fm0" => form_id },
        },
        "Contents" => content_id,
    });

    // Rewrite the page tree to hold only the new page. CropBox and
    // Rotate would inherit onto it, so they go too.
    let pages_dict = doc.get_object_mut(pages_id)?.as_dict_mut()?;
    pages_dict.set("Kids", vec![Object::Reference(new_page_id)]);
    pages_dict.set("Count", 1);
    pages_dict.remove(b"CropBox");
    pages_dict.remove(b"Rotate");

    doc.prune_objects();
    doc.renumber_objects();
    doc.compress();

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(lopdf::Error::from)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a one-page document with a text content stream, the way
    /// lopdf's own examples do.
    fn sample_pdf(width: i64, height: i64) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new("Tj", vec![Object::string_literal("Hello")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn page_media_box(data: &[u8]) -> [f32; 4] {
        let doc = Document::load_mem(data).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = pages[&1];
        media_box(&doc, page_id).unwrap()
    }

    #[test]
    fn test_y_from_bottom_conversion() {
        // 792pt page, crop 50 tall starting 72 from the top:
        // bottom edge sits at 792 - 72 - 50 = 670 from the bottom.
        assert_eq!(y_from_bottom(792.0, 72.0, 50.0), 670.0);
        // Full-page crop keeps the origin.
        assert_eq!(y_from_bottom(792.0, 0.0, 792.0), 0.0);
    }

    #[test]
    fn test_output_size_rounds_and_clamps() {
        let rect = |w, h| CropRect {
            x: 0.0,
            y: 0.0,
            width: w,
            height: h,
        };
        assert_eq!(output_size(&rect(100.4, 50.6)), (100, 51));
        assert_eq!(output_size(&rect(0.0, 0.0)), (1, 1));
        assert_eq!(output_size(&rect(-20.0, 0.2)), (1, 1));
    }

    #[test]
    fn test_crop_produces_single_page_of_requested_size() {
        let src = sample_pdf(612, 792);
        let out = crop_page(
            &src,
            0,
            CropRect {
                x: 72.0,
                y: 72.0,
                width: 100.0,
                height: 50.0,
            },
        )
        .unwrap();
        assert_eq!(page_media_box(&out), [0.0, 0.0, 100.0, 50.0]);
    }

    #[test]
    fn test_full_page_crop_keeps_original_dimensions() {
        let src = sample_pdf(612, 792);
        let out = crop_page(
            &src,
            0,
            CropRect {
                x: 0.0,
                y: 0.0,
                width: 612.0,
                height: 792.0,
            },
        )
        .unwrap();
        assert_eq!(page_media_box(&out), [0.0, 0.0, 612.0, 792.0]);

        // The original content survives inside the embedded XObject.
        let doc = Document::load_mem(&out).unwrap();
        let page_id = doc.get_pages()[&1];
        let content = doc.get_page_content(page_id).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains("/Fm0 Do"), "content was: {text}");
    }

    #[test]
    fn test_cm_matrix_carries_converted_offsets() {
        // x=72, y=72, h=50 on a 792pt page: the embedded page shifts by
        // (-72, -(792 - 72 - 50)) = (-72, -670).
        let src = sample_pdf(612, 792);
        let out = crop_page(
            &src,
            0,
            CropRect {
                x: 72.0,
                y: 72.0,
                width: 100.0,
                height: 50.0,
            },
        )
        .unwrap();

        let doc = Document::load_mem(&out).unwrap();
        let raw = doc.get_page_content(doc.get_pages()[&1]).unwrap();
        let content = Content::decode(&raw).unwrap();
        let cm = content
            .operations
            .iter()
            .find(|op| op.operator == "cm")
            .unwrap();
        let operands: Vec<f32> = cm.operands.iter().map(|o| number(o).unwrap()).collect();
        assert_eq!(operands, vec![1.0, 0.0, 0.0, 1.0, -72.0, -670.0]);
    }

    #[test]
    fn test_out_of_range_crop_still_yields_a_page() {
        let src = sample_pdf(612, 792);
        let out = crop_page(
            &src,
            0,
            CropRect {
                x: 10_000.0,
                y: 10_000.0,
                width: 40.0,
                height: 40.0,
            },
        )
        .unwrap();
        assert_eq!(page_media_box(&out), [0.0, 0.0, 40.0, 40.0]);
    }

    #[test]
    fn test_page_index_out_of_bounds() {
        let src = sample_pdf(612, 792);
        let rect = CropRect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        let err = crop_page(&src, 1, rect).unwrap_err();
        assert!(matches!(
            err,
            CropError::PageOutOfBounds { index: 1, count: 1 }
        ));
        let err = crop_page(&src, -1, rect).unwrap_err();
        assert!(matches!(err, CropError::PageOutOfBounds { index: -1, .. }));
    }

    #[test]
    fn test_garbage_input_is_a_pdf_error() {
        let rect = CropRect {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        };
        assert!(matches!(
            crop_page(b"not a pdf", 0, rect),
            Err(CropError::Pdf(_))
        ));
    }
}
