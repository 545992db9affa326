//! Page assembly with lopdf: concatenating pages from several documents,
//! merging overlay content onto a page, and writing results to disk.

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use uuid::Uuid;

use crate::error::{PdfToolsError, Result};
use crate::pdf::writer::Overlay;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `/Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 32;

/// Load a document from disk.
pub fn load_document(path: &Path) -> Result<Document> {
    Ok(Document::load(path)?)
}

/// Page object ids in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Builds a new document out of pages taken from existing ones.
///
/// Pages keep their content, resources and annotations. Document-level
/// structures of the sources (outlines, info, forms) are not carried over.
pub struct PageAssembler {
    document: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl Default for PageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PageAssembler {
    /// Start an empty document.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append every page of `source` in order.
    pub fn append_all(&mut self, source: Document) -> Result<()> {
        let count = source.get_pages().len();
        self.append_range(source, 0, count)
    }

    /// Append pages `start..end` (0-indexed, end exclusive) of `source`.
    pub fn append_range(&mut self, mut source: Document, start: usize, end: usize) -> Result<()> {
        source.renumber_objects_with(self.document.max_id + 1);

        let selected: Vec<ObjectId> = page_ids(&source)
            .into_iter()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect();

        let mut pages = Vec::with_capacity(selected.len());
        for &page_id in &selected {
            let mut page = inherited_page_dictionary(&source, page_id)?;
            page.set("Parent", Object::Reference(self.pages_id));
            pages.push((page_id, page));
        }

        self.document.max_id = self.document.max_id.max(source.max_id);

        for (object_id, object) in source.objects {
            match object.type_name().unwrap_or(b"") {
                b"Catalog" | b"Pages" | b"Page" | b"Outlines" | b"Outline" => {}
                _ => {
                    self.document.objects.insert(object_id, object);
                }
            }
        }

        for (page_id, page) in pages {
            self.document
                .objects
                .insert(page_id, Object::Dictionary(page));
            self.kids.push(page_id);
        }

        Ok(())
    }

    /// Close the page tree and return the finished document.
    ///
    /// Objects only reachable from pages that were not selected are dropped.
    pub fn finish(mut self) -> Document {
        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let count = kids.len() as i64;

        let pages = Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ]);
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.document.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.document
            .trailer
            .set("Root", Object::Reference(catalog_id));

        self.document.prune_objects();
        self.document.renumber_objects();
        self.document.compress();
        self.document
    }
}

/// Clone a page dictionary with inherited attributes copied onto it.
fn inherited_page_dictionary(doc: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut page = doc.get_dictionary(page_id)?.clone();

    for key in INHERITABLE_KEYS {
        if page.has(key) {
            continue;
        }
        if let Some(value) = inherited_value(doc, &page, key) {
            page.set(key.to_vec(), value);
        }
    }

    Ok(page)
}

/// Walk up `/Parent` links looking for `key`.
fn inherited_value(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}

/// Resolve `object` to a dictionary, following one reference if needed.
fn resolve_dictionary(doc: &Document, object: &Object) -> Result<Dictionary> {
    match object {
        Object::Dictionary(dict) => Ok(dict.clone()),
        Object::Reference(id) => Ok(doc.get_dictionary(*id)?.clone()),
        _ => Err(PdfToolsError::internal(
            "Expected a dictionary in the page resources",
        )),
    }
}

/// Current content stream references of a page, in drawing order.
fn content_references(doc: &Document, page: &Dictionary) -> Result<Vec<Object>> {
    let contents = match page.get(b"Contents") {
        Ok(contents) => contents,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Array(items) => Ok(items.clone()),
        Object::Reference(id) => match doc.get_object(*id)? {
            Object::Array(items) => Ok(items.clone()),
            _ => Ok(vec![Object::Reference(*id)]),
        },
        _ => Err(PdfToolsError::internal("Page contents are not a stream")),
    }
}

/// Draw `overlay` on top of the existing content of `page_id`.
///
/// The original content is wrapped in `q`/`Q` so its graphics state cannot
/// leak into the overlay; both layers stay on the page.
pub fn apply_overlay(doc: &mut Document, page_id: ObjectId, overlay: &Overlay) -> Result<()> {
    let page = doc.get_dictionary(page_id)?.clone();

    let mut resources = match page.get(b"Resources") {
        Ok(object) => resolve_dictionary(doc, object)?,
        Err(_) => match inherited_value(doc, &page, b"Resources") {
            Some(object) => resolve_dictionary(doc, &object)?,
            None => Dictionary::new(),
        },
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(object) => resolve_dictionary(doc, object)?,
        Err(_) => Dictionary::new(),
    };
    for (name, font) in &overlay.fonts {
        let font_id = doc.add_object(font.clone());
        fonts.set(name.as_bytes().to_vec(), Object::Reference(font_id));
    }
    resources.set("Font", Object::Dictionary(fonts));

    let existing = content_references(doc, &page)?;
    let save_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay.content.encode()?));

    let mut contents = Vec::with_capacity(existing.len() + 3);
    contents.push(Object::Reference(save_id));
    contents.extend(existing);
    contents.push(Object::Reference(restore_id));
    contents.push(Object::Reference(overlay_id));

    let page = doc.get_dictionary_mut(page_id)?;
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Array(contents));

    Ok(())
}

/// Serialize `doc` and move it into place at `path`.
///
/// Bytes go to a sibling temporary file first, so `path` is either left
/// untouched or fully replaced.
pub fn write_document(doc: &mut Document, path: &Path) -> Result<u64> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;

    let temp = temp_sibling(path);
    std::fs::write(&temp, &bytes)?;
    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(e.into());
    }

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote PDF");
    Ok(bytes.len() as u64)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.pdf".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::writer::{text_page_document, OVERLAY_FONT_NAME};

    fn multi_page_document(titles: &[&str]) -> Document {
        let mut assembler = PageAssembler::new();
        for title in titles {
            assembler
                .append_all(text_page_document(title, "body").unwrap())
                .unwrap();
        }
        assembler.finish()
    }

    fn page_title(doc: &Document, page_number: u32) -> String {
        doc.extract_text(&[page_number]).unwrap()
    }

    #[test]
    fn test_append_preserves_order() {
        let doc = multi_page_document(&["Alpha", "Beta", "Gamma"]);
        assert_eq!(doc.get_pages().len(), 3);
        assert!(page_title(&doc, 1).contains("Alpha"));
        assert!(page_title(&doc, 2).contains("Beta"));
        assert!(page_title(&doc, 3).contains("Gamma"));
    }

    #[test]
    fn test_append_range_selects_pages() {
        let source = multi_page_document(&["One", "Two", "Three", "Four"]);
        let mut assembler = PageAssembler::new();
        assembler.append_range(source, 1, 3).unwrap();
        assert_eq!(assembler.page_count(), 2);

        let doc = assembler.finish();
        assert_eq!(doc.get_pages().len(), 2);
        assert!(page_title(&doc, 1).contains("Two"));
        assert!(page_title(&doc, 2).contains("Three"));
    }

    #[test]
    fn test_empty_assembly_has_no_pages() {
        let doc = PageAssembler::new().finish();
        assert!(doc.get_pages().is_empty());
    }

    #[test]
    fn test_inherited_resources_are_materialized() {
        let mut source = text_page_document("Inherited", "body").unwrap();
        let page_id = page_ids(&source)[0];
        let pages_id = source
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Parent")
            .unwrap()
            .as_reference()
            .unwrap();

        // Move Resources and MediaBox up to the page tree root.
        let page = source.get_dictionary_mut(page_id).unwrap();
        let resources = page.remove(b"Resources").unwrap();
        let media_box = page.remove(b"MediaBox").unwrap();
        let root = source.get_dictionary_mut(pages_id).unwrap();
        root.set("Resources", resources);
        root.set("MediaBox", media_box);

        let mut assembler = PageAssembler::new();
        assembler.append_all(source).unwrap();
        let doc = assembler.finish();

        let page = doc.get_dictionary(page_ids(&doc)[0]).unwrap();
        assert!(page.has(b"Resources"));
        assert!(page.has(b"MediaBox"));
    }

    #[test]
    fn test_apply_overlay_keeps_existing_content() {
        let mut doc = text_page_document("Base", "original").unwrap();
        let page_id = page_ids(&doc)[0];

        apply_overlay(&mut doc, page_id, &Overlay::footer_line("stamped")).unwrap();

        let page = doc.get_dictionary(page_id).unwrap();
        let contents = page.get(b"Contents").unwrap().as_array().unwrap();
        assert_eq!(contents.len(), 4);

        let fonts = page
            .get(b"Resources")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"Font")
            .unwrap()
            .as_dict()
            .unwrap();
        assert!(fonts.has(b"F1"));
        assert!(fonts.has(OVERLAY_FONT_NAME.as_bytes()));

        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("original"));
        assert!(text.contains("stamped"));
    }

    #[test]
    fn test_write_document_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        std::fs::write(&path, b"stale").unwrap();

        let mut doc = text_page_document("Fresh", "").unwrap();
        let written = write_document(&mut doc, &path).unwrap();

        let on_disk = std::fs::read(&path).unwrap();
        assert_eq!(on_disk.len() as u64, written);
        assert!(on_disk.starts_with(b"%PDF"));

        // Only the target remains; no temporary files are left behind.
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
