use opdiff::{
    DetailLevel, DiffOptions, Differ, Error, Format, Registry, Renderer, RendererConfig, SideBySide,
    compute,
};
use rayon::prelude::*;
use snapbox::assert_data_eq;

fn no_detail() -> DiffOptions {
    DiffOptions {
        detail_level: DetailLevel::None,
        ..DiffOptions::default()
    }
}

// Line numbers of every row, left and right, in the order they were rendered
fn row_numbers(output: &str) -> (Vec<usize>, Vec<usize>) {
    fn number(row: &str, class: &str) -> Option<usize> {
        let marker = format!(r#"<th class="{class}">"#);
        let start = row.find(&marker)? + marker.len();
        let end = start + row[start..].find('<')?;
        row[start..end].parse().ok()
    }

    let mut old = Vec::new();
    let mut new = Vec::new();
    for row in output.split("<tr>").skip(1) {
        old.extend(number(row, "f-num"));
        new.extend(number(row, "t-num"));
    }
    (old, new)
}

#[test]
fn identical_inputs_render_identical_result() {
    let registry = Registry::default();
    for descriptor in registry.descriptors() {
        let output = registry
            .compute(
                vec!["a", "b"],
                vec!["a", "b"],
                descriptor.name,
                DiffOptions::new(),
                RendererConfig::default(),
            )
            .unwrap();
        assert_eq!(output, descriptor.identical_result);

        // The full pipeline agrees with the shortcut
        let differ = Differ::new(vec!["a", "b"], vec!["a", "b"], DiffOptions::new());
        let renderer = registry
            .create(descriptor.name, RendererConfig::default())
            .unwrap();
        assert_eq!(renderer.render(&differ), output);

        // As do inputs which only compare equal once normalized
        let differ = Differ::new(
            vec!["A", "b"],
            vec!["a", "b"],
            DiffOptions {
                ignore_case: true,
                ..DiffOptions::default()
            },
        );
        assert_eq!(renderer.render(&differ), output);
    }
}

#[test]
fn side_by_side_insert_into_empty() {
    let output = compute(
        Vec::<&str>::new(),
        vec!["a"],
        "SideBySide",
        DiffOptions::new(),
        RendererConfig::default(),
    )
    .unwrap();

    assert_data_eq!(
        output,
        concat!(
            r#"<table class="diff diff-html diff-side-by-side">"#,
            r#"<thead><tr><th colspan="2">Old</th><th colspan="2">New</th></tr></thead>"#,
            r#"<tbody class="change change-ins">"#,
            r#"<tr><th>&#xA0;</th><td class="old">&#xA0;</td><th class="t-num">1</th><td class="new"><ins>a</ins></td></tr>"#,
            "</tbody>",
            "</table>",
        )
    );
}

#[test]
fn side_by_side_replace_with_fewer_lines() {
    let output = compute(
        ["x", "y", "z"],
        ["w"],
        "SideBySide",
        no_detail(),
        RendererConfig::default(),
    )
    .unwrap();

    assert_data_eq!(
        output,
        concat!(
            r#"<table class="diff diff-html diff-side-by-side">"#,
            r#"<thead><tr><th colspan="2">Old</th><th colspan="2">New</th></tr></thead>"#,
            r#"<tbody class="change change-rep">"#,
            r#"<tr><th class="f-num">1</th><td class="old"><span>x</span></td><th class="t-num">1</th><td class="new"><span>w</span></td></tr>"#,
            r#"<tr><th class="f-num">2</th><td class="old"><span>y</span></td><th>&#xA0;</th><td class="new">&#xA0;</td></tr>"#,
            r#"<tr><th class="f-num">3</th><td class="old"><span>z</span></td><th>&#xA0;</th><td class="new">&#xA0;</td></tr>"#,
            "</tbody>",
            "</table>",
        )
    );
}

#[test]
fn side_by_side_shows_every_line_once() {
    let old = "\
The Way that can be told of is not the eternal Way;
The name that can be named is not the eternal name.
The Nameless is the origin of Heaven and Earth;
The Named is the mother of all things.
Therefore let there always be non-being,
  so we may see their subtlety,
And let there always be being,
  so we may see their outcome.
The two are the same,
But after they are produced,
  they have different names.";

    let new = "\
The Nameless is the origin of Heaven and Earth;
The named is the mother of all things.

Therefore let there always be non-being,
  so we may see their subtlety,
And let there always be being,
  so we may see their outcome.
The two are the same,
But after they are produced,
  they have different names.
They both may be called deep and profound.
Deeper and more profound,
The door of all subtleties!";

    let options = DiffOptions {
        context_lines: usize::MAX,
        ..DiffOptions::default()
    };
    let output = compute(old, new, "SideBySide", options, RendererConfig::default()).unwrap();
    let (old_numbers, new_numbers) = row_numbers(&output);
    assert_eq!(old_numbers, (1..=11).collect::<Vec<_>>());
    assert_eq!(new_numbers, (1..=13).collect::<Vec<_>>());

    // With less context, elided lines are replaced by a single marker
    let options = DiffOptions {
        context_lines: 1,
        ..DiffOptions::default()
    };
    let output = compute(old, new, "SideBySide", options, RendererConfig::default()).unwrap();
    let (old_numbers, new_numbers) = row_numbers(&output);
    assert_eq!(old_numbers, [1, 2, 3, 4, 5, 11]);
    assert_eq!(new_numbers, [1, 2, 3, 4, 10, 11, 12, 13]);
    assert_eq!(output.matches(r#"<tbody class="skipped">"#).count(), 1);
}

#[test]
fn unified_output() {
    let old = "fn main() {\n    println!(\"hello\");\n}\n";
    let new = "fn main() {\n    println!(\"hello, world\");\n}\n";
    let output = compute(old, new, "Unified", DiffOptions::new(), RendererConfig::default()).unwrap();

    // The trailing newline leaves an empty last line on both sides
    assert_data_eq!(
        output,
        concat!(
            "@@ -1,4 +1,4 @@\n",
            " fn main() {\n",
            "-    println!(\"hello\");\n",
            "+    println!(\"hello, world\");\n",
            " }\n",
            " \n",
        )
    );
}

#[test]
fn errors() {
    let result = compute("a", "b", "Sideways", DiffOptions::new(), RendererConfig::default());
    assert!(matches!(result, Err(Error::UnknownTemplate(name)) if name == "Sideways"));

    let result = compute(
        vec!["a\nb"],
        vec!["a"],
        "Unified",
        DiffOptions::new(),
        RendererConfig::default(),
    );
    assert!(matches!(result, Err(Error::InvalidSequence { .. })));

    let result = RendererConfig::from_json(r#"{ "separateBlock": "yes" }"#);
    assert!(matches!(result, Err(Error::InvalidOptions(_))));
}

#[test]
fn concurrent_rendering_of_one_diff() {
    let old: Vec<String> = (0..500).map(|i| format!("line {}", i % 37)).collect();
    let new: Vec<String> = (0..480).map(|i| format!("line {}", (i * 7) % 41)).collect();
    let differ = Differ::new(
        old.iter().map(String::as_str).collect(),
        new.iter().map(String::as_str).collect(),
        DiffOptions::new(),
    );

    let registry = Registry::default();
    let renderers: Vec<Box<dyn Renderer>> = registry
        .names()
        .map(|name| registry.create(name, RendererConfig::default()).unwrap())
        .collect();

    let sequential: Vec<String> = renderers.iter().map(|r| r.render(&differ)).collect();
    let parallel: Vec<String> = renderers.par_iter().map(|r| r.render(&differ)).collect();
    assert_eq!(sequential, parallel);

    let side_by_side = SideBySide::with_config(RendererConfig::default()).unwrap();
    let repeated: Vec<String> = (0..8)
        .into_par_iter()
        .map(|_| side_by_side.render(&differ))
        .collect();
    assert!(repeated.iter().all(|output| *output == sequential[0]));
}
