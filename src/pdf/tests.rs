use super::transpiler::renumber_references;
use super::{document_filename, render_paper, Compiler, Transpiler};
use crate::paper::{PaperContent, PaperRequest, PaperTable, Section};
use crate::sessions::Author;

fn author(name: &str) -> Author {
    Author {
        name: name.to_string(),
        department: "Dept. of Computer Science".to_string(),
        institution: "Example University".to_string(),
        city: "Springfield, USA".to_string(),
        email: format!("{}@example.edu", name.to_lowercase().replace(' ', ".")),
    }
}

fn request(pages: u8, authors: usize) -> PaperRequest {
    PaperRequest {
        title: "adaptive caching in distributed systems".to_string(),
        authors: (0..authors).map(|i| author(&format!("Author {i}"))).collect(),
        pages,
    }
}

fn words(n: usize) -> String {
    let sentence = "The proposed approach reduces end to end latency under sustained load while keeping memory overhead within practical bounds for commodity hardware deployments. ";
    let per_sentence = sentence.split_whitespace().count();
    sentence.repeat(n.div_ceil(per_sentence))
}

fn content(words_per_section: usize) -> PaperContent {
    let mut content = PaperContent::default();
    for section in Section::OUTLINE {
        let body = if section == Section::Abstract {
            words(130)
        } else {
            format!("{} Prior systems [1] and [2] differ in scope.", words(words_per_section))
        };
        content.sections.insert(section, body);
    }
    content.keywords = vec![
        "caching".to_string(),
        "distributed systems".to_string(),
        "latency".to_string(),
    ];
    content.table = Some(PaperTable {
        caption: "TABLE I: Performance Comparison of Methods".to_string(),
        header: vec!["Method".to_string(), "Accuracy (%)".to_string()],
        rows: vec![
            vec!["Baseline".to_string(), "84.2".to_string()],
            vec!["Proposed Method".to_string(), "95.3".to_string()],
        ],
    });
    content.references = (1..=8)
        .map(|i| format!("[{i}] A. Author, \"Result number {i},\" in Proc. Conf., 2024."))
        .collect();
    content
}

#[test]
fn transpile_emits_two_column_a4_layout() {
    let markup = Transpiler::transpile(&request(6, 1), &content(200));
    assert!(markup.contains("paper: \"a4\""));
    assert!(markup.contains("columns: 2"));
    assert!(markup.contains("margin: (top: 0.75in, bottom: 1in, left: 0.625in, right: 0.625in)"));
    assert!(markup.contains("gutter: 0.25in"));
}

#[test]
fn transpile_title_cases_the_document_title() {
    let markup = Transpiler::transpile(&request(6, 1), &content(100));
    assert!(markup.contains("Adaptive Caching in Distributed Systems"));
}

#[test]
fn transpile_lays_out_numbered_headings_in_order() {
    let markup = Transpiler::transpile(&request(6, 1), &content(100));
    let intro = markup.find("I. INTRODUCTION").expect("intro heading");
    let related = markup.find("II. RELATED WORK").expect("related heading");
    let method = markup.find("III. METHODOLOGY").expect("methodology heading");
    let results = markup.find("IV. RESULTS AND DISCUSSION").expect("results heading");
    let conclusion = markup.find("V. CONCLUSION AND FUTURE WORK").expect("conclusion heading");
    let refs = markup.find("REFERENCES").expect("references heading");
    assert!(intro < related && related < method && method < results);
    assert!(results < conclusion && conclusion < refs);
}

#[test]
fn transpile_single_author_stacks_multiple_authors_grid() {
    let single = Transpiler::transpile(&request(6, 1), &content(50));
    assert!(!single.contains("#grid(columns: (1fr"));
    assert!(single.contains("Author 0"));

    let triple = Transpiler::transpile(&request(6, 3), &content(50));
    assert!(triple.contains("#grid(columns: (1fr, 1fr, 1fr)"));
    assert!(triple.contains("Author 2"));
}

#[test]
fn transpile_renders_abstract_and_index_terms() {
    let markup = Transpiler::transpile(&request(6, 1), &content(50));
    assert!(markup.contains("[Abstract]—"));
    assert!(markup.contains("[Index Terms]—caching, distributed systems, latency"));
}

#[test]
fn transpile_lifts_equation_markers_out_of_paragraphs() {
    let mut content = content(50);
    content.sections.insert(
        Section::Methodology,
        "We minimize the loss. EQUATION: L = sum w_i x_i (1) The weights are learned."
            .to_string(),
    );
    let markup = Transpiler::transpile(&request(6, 1), &content);
    assert!(markup.contains("#grid(columns: (85%, 15%)"));
    assert!(markup.contains("(1)"));
    assert!(!markup.contains("EQUATION:"));
}

#[test]
fn transpile_places_comparison_table_after_results() {
    let markup = Transpiler::transpile(&request(6, 1), &content(100));

    let results = markup.find("IV. RESULTS AND DISCUSSION").expect("results heading");
    let table = markup.find("#table(").expect("table block");
    let conclusion = markup.find("V. CONCLUSION AND FUTURE WORK").expect("conclusion heading");
    assert!(results < table && table < conclusion);

    // Two-line caption above the table, all caps.
    let caption = markup.find("TABLE I").expect("caption label");
    assert!(caption < table);
    assert!(markup.contains("PERFORMANCE COMPARISON OF METHODS"));
    assert!(markup.contains("columns: 2,"));
    assert!(markup.contains("table.header([#text(weight: \"bold\")[Method]]"));
    assert!(markup.contains("[Proposed Method]"));
}

#[test]
fn transpile_without_table_omits_the_block() {
    let mut content = content(100);
    content.table = None;
    let markup = Transpiler::transpile(&request(6, 1), &content);
    assert!(!markup.contains("#table("));
}

#[test]
fn render_with_table_produces_a_pdf() {
    let rendered = render_paper(&request(4, 1), &content(60)).expect("render");
    assert!(rendered.bytes.starts_with(b"%PDF"));
}

#[test]
fn renumber_orders_references_by_first_citation() {
    let mut bodies = vec![
        (Section::Introduction, "Built on [3] and later [1].".to_string()),
        (Section::RelatedWork, "See [3] again, then [2].".to_string()),
    ];
    let refs = vec![
        "[1] First entry.".to_string(),
        "[2] Second entry.".to_string(),
        "[3] Third entry.".to_string(),
        "[4] Uncited entry.".to_string(),
    ];
    let ordered = renumber_references(&mut bodies, &refs);

    assert_eq!(
        ordered,
        vec![
            "Third entry.".to_string(),
            "First entry.".to_string(),
            "Second entry.".to_string(),
            "Uncited entry.".to_string(),
        ]
    );
    assert_eq!(bodies[0].1, "Built on [1] and later [2].");
    assert_eq!(bodies[1].1, "See [1] again, then [3].");
}

#[test]
fn renumber_leaves_out_of_range_citations_alone() {
    let mut bodies = vec![(Section::Introduction, "Cites [1] and bogus [9].".to_string())];
    let refs = vec!["[1] Only entry.".to_string()];
    renumber_references(&mut bodies, &refs);
    assert_eq!(bodies[0].1, "Cites [1] and bogus [9].");
}

#[test]
fn compile_produces_a_pdf() {
    let rendered = Compiler::compile("Hello, world.").expect("compile");
    assert!(rendered.bytes.starts_with(b"%PDF"));
    assert_eq!(rendered.pages, 1);
}

#[test]
fn render_page_count_tracks_the_request() {
    let request = request(6, 2);
    // 900 words per page across five numbered sections plus the abstract.
    let rendered = render_paper(&request, &content(1080)).expect("render");
    assert!(rendered.bytes.starts_with(b"%PDF"));
    assert!(
        (4..=9).contains(&rendered.pages),
        "expected roughly six pages, got {}",
        rendered.pages
    );
}

#[test]
fn render_survives_markup_hostile_text() {
    let mut request = request(4, 1);
    request.title = "C# vs *Rust*: a [fair] comparison // really".to_string();
    let mut content = content(40);
    content.sections.insert(
        Section::Results,
        "Raw tokens: #set page $x^2$ `code` _under_ \\back [5] https://a.b/c".to_string(),
    );
    let rendered = render_paper(&request, &content).expect("render");
    assert!(rendered.bytes.starts_with(b"%PDF"));
}

#[test]
fn document_filename_sanitizes_and_truncates() {
    assert_eq!(
        document_filename("Adaptive Caching: A Survey"),
        "IEEE_Adaptive_Caching__A_Survey.pdf"
    );
    let long = "x".repeat(120);
    let name = document_filename(&long);
    assert_eq!(name, format!("IEEE_{}.pdf", "x".repeat(50)));
    assert_eq!(document_filename("!!!"), "IEEE_paper.pdf");
}
