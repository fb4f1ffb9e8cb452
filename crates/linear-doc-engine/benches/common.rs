// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use linear_doc_engine::{Document, Element, Item, NodeType};

#[allow(dead_code)]
pub fn paragraph(text: &str) -> Vec<Item> {
    let mut data = vec![Item::open(NodeType::Paragraph)];
    data.extend(Item::text(text));
    data.push(Item::close(NodeType::Paragraph));
    data
}

/// `sections` headings, each followed by a paragraph and a two item list.
#[allow(dead_code)]
pub fn generate_document(sections: usize) -> Document {
    let mut data: Vec<Item> = Vec::new();
    for section in 0..sections {
        data.push(Element::new(NodeType::Heading).attribute("level", 2).into());
        data.extend(Item::text(&format!("Section {section}")));
        data.push(Item::close(NodeType::Heading));
        data.extend(paragraph(
            "Some paragraph content with multiple sentences. This helps create realistic document structure.",
        ));
        data.push(Element::new(NodeType::List).attribute("style", "bullet").into());
        for item in 0..2 {
            data.push(Item::open(NodeType::ListItem));
            data.extend(paragraph(&format!("Item {item}")));
            data.push(Item::close(NodeType::ListItem));
        }
        data.push(Item::close(NodeType::List));
    }
    Document::from_data(data).unwrap()
}
