use base64::prelude::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelCombinationError {
    #[error("No label documents were returned.")]
    Empty,
    #[error("Label document {index} is not valid base64: {reason}")]
    Encoding { index: usize, reason: String },
    #[error("Label document {0} is not a PDF document.")]
    NotPdf(usize),
    #[error("Label document {index} is corrupt: {reason}")]
    Corrupt { index: usize, reason: String },
    #[error("Label documents could not be merged: {0}")]
    Merge(String),
}

/// Merges the documents returned for one shipment into a single printable file.
pub trait LabelCombinator: Send + Sync {
    fn combine(&self, documents: &[String]) -> Result<Vec<u8>, LabelCombinationError>;
}

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
const MAX_TREE_DEPTH: usize = 64;

/// Decodes base64 PDF documents and appends their pages into one document.
///
/// A single document is returned as decoded. Shipments with a return label,
/// export documents or a COD label come with several documents; their pages
/// are merged in the order the documents were returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfDocumentCombinator;

impl PdfDocumentCombinator {
    fn decode(index: usize, document: &str) -> Result<Vec<u8>, LabelCombinationError> {
        let bytes = BASE64_STANDARD
            .decode(document.trim())
            .map_err(|e| LabelCombinationError::Encoding {
                index,
                reason: e.to_string(),
            })?;
        if !bytes.starts_with(b"%PDF-") {
            return Err(LabelCombinationError::NotPdf(index));
        }
        Ok(bytes)
    }

    fn merge(documents: &[Vec<u8>]) -> Result<Vec<u8>, LabelCombinationError> {
        let mut merged = Document::with_version("1.5");
        let pages_id = merged.new_object_id();
        let mut kids = Vec::new();

        for (index, bytes) in documents.iter().enumerate() {
            let corrupt = |reason: String| LabelCombinationError::Corrupt { index, reason };

            let mut document = Document::load_mem(bytes).map_err(|e| corrupt(e.to_string()))?;
            document.renumber_objects_with(merged.max_id + 1);

            let pages: Vec<ObjectId> = document.get_pages().into_values().collect();
            if pages.is_empty() {
                return Err(corrupt("the document has no pages".to_string()));
            }
            for page_id in &pages {
                inherit_attributes(&mut document, *page_id);
                if let Some(Object::Dictionary(page)) = document.objects.get_mut(page_id) {
                    page.set("Parent", Object::Reference(pages_id));
                }
            }

            document
                .objects
                .retain(|_, object| !matches!(type_name(object), Some(b"Catalog" | b"Pages")));
            merged.max_id = merged.max_id.max(document.max_id);
            merged.objects.extend(document.objects);
            kids.extend(pages.into_iter().map(Object::Reference));
        }

        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(kids.len() as i64));
        pages.set("Kids", Object::Array(kids));
        merged.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = merged.add_object(Object::Dictionary(catalog));
        merged.trailer.set("Root", Object::Reference(catalog_id));

        let mut out = Vec::new();
        merged
            .save_to(&mut out)
            .map_err(|e| LabelCombinationError::Merge(e.to_string()))?;
        Ok(out)
    }
}

impl LabelCombinator for PdfDocumentCombinator {
    fn combine(&self, documents: &[String]) -> Result<Vec<u8>, LabelCombinationError> {
        let decoded = documents
            .iter()
            .filter(|d| !d.trim().is_empty())
            .enumerate()
            .map(|(index, document)| Self::decode(index, document))
            .collect::<Result<Vec<_>, _>>()?;

        match decoded.len() {
            0 => Err(LabelCombinationError::Empty),
            1 => Ok(decoded.into_iter().flatten().collect()),
            _ => Self::merge(&decoded),
        }
    }
}

fn type_name(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}

/// Copy attributes the page inherits from its page tree onto the page itself,
/// so the page keeps them once it is moved under a new parent.
fn inherit_attributes(document: &mut Document, page_id: ObjectId) {
    let mut inherited: Vec<(&[u8], Object)> = Vec::new();
    {
        let Ok(page) = document.get_dictionary(page_id) else {
            return;
        };
        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        let mut depth = 0;
        while let Some(node_id) = parent {
            depth += 1;
            if depth > MAX_TREE_DEPTH {
                break;
            }
            let Ok(node) = document.get_dictionary(node_id) else {
                break;
            };
            for key in INHERITABLE {
                if page.has(key) || inherited.iter().any(|(k, _)| *k == key) {
                    continue;
                }
                if let Ok(value) = node.get(key) {
                    inherited.push((key, value.clone()));
                }
            }
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        }
    }

    if let Some(Object::Dictionary(page)) = document.objects.get_mut(&page_id) {
        for (key, value) in inherited {
            page.set(key.to_vec(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;

    /// A document with one page per entry of `texts`. Page size lives on the
    /// page tree root so merging has to carry it over.
    fn pdf(texts: &[&str]) -> String {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for text in texts {
            let content = format!("BT /F1 12 Tf 40 780 Td ({text}) Tj ET");
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
            let mut page = Dictionary::new();
            page.set("Type", Object::Name(b"Page".to_vec()));
            page.set("Parent", Object::Reference(pages_id));
            page.set("Contents", Object::Reference(content_id));
            kids.push(Object::Reference(doc.add_object(page)));
        }
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Count", Object::Integer(kids.len() as i64));
        pages.set("Kids", Object::Array(kids));
        pages.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(298),
                Object::Integer(420),
            ]),
        );
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        BASE64_STANDARD.encode(out)
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    #[test]
    fn test_single_document_is_decoded() {
        let label = pdf(&["label"]);
        let content = PdfDocumentCombinator.combine(&[label.clone()]).unwrap();
        assert_eq!(content, BASE64_STANDARD.decode(label).unwrap());
    }

    #[test]
    fn test_blank_documents_are_skipped() {
        let content = PdfDocumentCombinator
            .combine(&[String::new(), pdf(&["label"])])
            .unwrap();
        assert!(content.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_invalid_documents() {
        assert_eq!(
            PdfDocumentCombinator.combine(&[]),
            Err(LabelCombinationError::Empty)
        );
        assert_eq!(
            PdfDocumentCombinator.combine(&[BASE64_STANDARD.encode("GIF89a")]),
            Err(LabelCombinationError::NotPdf(0))
        );
        assert!(matches!(
            PdfDocumentCombinator.combine(&["***".to_string()]),
            Err(LabelCombinationError::Encoding { index: 0, .. })
        ));
    }

    #[test]
    fn test_documents_are_merged_in_order() {
        let content = PdfDocumentCombinator
            .combine(&[pdf(&["label"]), pdf(&["return label", "export document"])])
            .unwrap();

        let merged = Document::load_mem(&content).unwrap();
        let pages = merged.get_pages();
        assert_eq!(pages.len(), 3);
        for page_id in pages.values() {
            let page = merged.get_dictionary(*page_id).unwrap();
            assert!(page.has(b"MediaBox"));
        }
        assert!(contains(&content, "(label)"));
        assert!(contains(&content, "(return label)"));
        assert!(contains(&content, "(export document)"));
    }

    #[test]
    fn test_corrupt_document_fails_merge() {
        let broken = BASE64_STANDARD.encode("%PDF-1.4\nnot really a pdf\n%%EOF");
        assert!(matches!(
            PdfDocumentCombinator.combine(&[pdf(&["label"]), broken]),
            Err(LabelCombinationError::Corrupt { index: 1, .. })
        ));
    }
}
