//! Markdown pipeline behaviour seen from outside the crate

use richcopy::config::ConversionConfig;
use richcopy::html::{self, Fragment};
use richcopy::markdown::{comrak_options, MarkdownPipeline, Stage};
use richcopy::style::{inline_styles, Stylesheet};
use richcopy::Error;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn convert(markdown: &str, config: &ConversionConfig) -> String {
    MarkdownPipeline::new().to_html(markdown, config)
}

#[test]
fn test_plain_config_matches_base_parser() {
    init();
    let markdown = "# Head\n\nSome *text* with `code` and [link](http://a.b).\n\n- a\n- b\n";
    let html = MarkdownPipeline::new().render(markdown, &ConversionConfig::plain());
    assert_eq!(html, comrak::markdown_to_html(markdown, &comrak_options()));
}

#[test]
fn test_wikilink_brackets_removed() {
    init();
    let config = ConversionConfig {
        wrap_result: false,
        ..ConversionConfig::default()
    };
    assert_eq!(convert("[[Target]]", &config), "<p>Target</p>\n");
}

#[test]
fn test_highlight_classes() {
    init();
    let html = convert("==hi== and =={red}there==", &ConversionConfig::default());
    assert!(html.contains(r#"<span class="cm-custom-highlight cm-highlight">hi</span>"#));
    assert!(html.contains(
        r#"<span class="cm-custom-highlight cm-highlight cm-custom-highlight-red">there</span>"#
    ));
}

#[test]
fn test_super_and_subscript() {
    init();
    let config = ConversionConfig {
        extended_support: true,
        ..ConversionConfig::default()
    };
    let html = convert("x^2^ and H~2~O", &config);
    assert!(html.contains("x<sup>2</sup>"));
    assert!(html.contains("H<sub>2</sub>O"));
}

#[test]
fn test_tags_styled_or_removed() {
    init();
    let styled = convert("plan #todo", &ConversionConfig::default());
    assert!(styled.contains(r#"<span class="tag">#todo</span>"#));

    let config = ConversionConfig {
        remove_tags: true,
        ..ConversionConfig::default()
    };
    assert!(!convert("plan #todo", &config).contains("#todo"));
}

#[test]
fn test_comments_removed_before_parsing() {
    init();
    let html = convert("keep %%drop\nthis%% me", &ConversionConfig::default());
    assert!(html.contains("keep"));
    assert!(html.contains("me"));
    assert!(!html.contains("drop"));
}

#[test]
fn test_code_is_never_rewritten() {
    init();
    let html = convert("`==x== #y`\n\n```\n[[z]] ==w==\n```\n", &ConversionConfig::default());
    assert!(html.contains("<code>==x== #y</code>"));
    assert!(html.contains("[[z]] ==w=="));
    assert!(!html.contains("cm-highlight"));
}

#[test]
fn test_custom_hook_runs_in_registration_order() {
    init();
    let mut pipeline = MarkdownPipeline::new();
    pipeline
        .hooks_mut()
        .register(Stage::AfterStrikethrough, "first", |text, _| text.replace("a", "b"))
        .register(Stage::AfterStrikethrough, "second", |text, _| text.replace("b", "c"));
    let html = pipeline.render("a", &ConversionConfig::plain());
    assert_eq!(html, "<p>c</p>\n");
}

#[test]
fn test_conversion_is_repeatable() {
    init();
    let markdown = "# T\n\n==a== #b [[c|d]] `e`\n";
    let config = ConversionConfig::default();
    let pipeline = MarkdownPipeline::new();
    assert_eq!(pipeline.to_html(markdown, &config), pipeline.to_html(markdown, &config));
}

#[test]
fn test_inline_style_survives_sheet() {
    init();
    let config = ConversionConfig {
        wrap_result: false,
        ..ConversionConfig::default()
    };
    let html = convert(r#"<span style="color: blue">x</span>"#, &config);
    let mut fragment = Fragment::parse(&html).unwrap();
    let sheet = Stylesheet::parse("theme", "span { color: red; font-weight: bold }");
    inline_styles(&mut fragment, &[sheet], false);

    let html = fragment.inner_html().unwrap();
    assert!(html.contains(r#"style="color: blue; font-weight: bold;""#));
}

#[test]
fn test_invalid_filter_leaves_fragment() {
    init();
    let html = convert("# Title\n\nbody", &ConversionConfig::default());
    let mut fragment = Fragment::parse(&html).unwrap();
    let before = fragment.inner_html().unwrap();

    let result = html::filter("div[", &mut fragment);
    assert!(matches!(result, Err(Error::Selector { .. })));
    assert_eq!(fragment.inner_html().unwrap(), before);

    assert_eq!(html::filter("h1", &mut fragment).unwrap(), 1);
    assert!(!fragment.text().contains("Title"));
}
