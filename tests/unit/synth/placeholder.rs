use super::*;

fn canvas() -> Canvas {
    Canvas::new(64, 48).unwrap()
}

#[test]
fn solid_color_is_stable_per_prompt() {
    let synth = PlaceholderSynthesizer::new(PlaceholderOpts {
        style: PlaceholderStyle::SolidColor,
        ..Default::default()
    });
    let a1 = synth.render_frame("A sunrise over hills.", canvas()).unwrap();
    let a2 = synth.render_frame("A sunrise over hills.", canvas()).unwrap();
    let b = synth.render_frame("A flower blooms.", canvas()).unwrap();
    assert_eq!(a1, a2);
    assert_ne!(a1, b);
    assert_eq!(&a1.as_raw()[..3], &prompt_color("A sunrise over hills.").to_array());
}

#[test]
fn text_stamp_keeps_background_at_corners() {
    let synth = PlaceholderSynthesizer::default();
    let frame = synth.render_frame("Hello there", canvas()).unwrap();
    assert_eq!(frame.canvas(), canvas());
    assert_eq!(&frame.as_raw()[..3], &[255, 255, 255]);
    let last = frame.as_raw().len() - 3;
    assert_eq!(&frame.as_raw()[last..], &[255, 255, 255]);
}

#[test]
fn text_stamp_is_deterministic() {
    let synth = PlaceholderSynthesizer::default();
    let a = synth.render_frame("Same words & <symbols>", canvas()).unwrap();
    let b = synth.render_frame("Same words & <symbols>", canvas()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn synthesize_returns_decodable_png_of_requested_size() {
    let synth = PlaceholderSynthesizer::default();
    let bytes = synth.synthesize("A flower blooms.", 32, 16).unwrap();
    let img = image::load_from_memory(&bytes).unwrap();
    assert_eq!((img.width(), img.height()), (32, 16));
    assert!(synth.synthesize("x", 0, 16).is_err());
}

#[test]
fn wrap_respects_width_breaks_and_line_cap() {
    let lines = wrap_text("aa bb cc dd", 5, 10);
    assert_eq!(lines, ["aa bb", "cc dd"]);

    let lines = wrap_text("first\nsecond line", 100, 10);
    assert_eq!(lines, ["first", "second line"]);

    let lines = wrap_text("a b c d e f", 1, 2);
    assert_eq!(lines, ["a", "b…"]);

    let lines = wrap_text("unbreakableword", 3, 5);
    assert_eq!(lines, ["unbreakableword"]);
}

#[test]
fn svg_escapes_markup() {
    let svg = build_stamp_svg("<b>&\"'", canvas(), &PlaceholderOpts::default());
    assert!(svg.contains("&lt;b&gt;&amp;&quot;&apos;"));
    assert!(!svg.contains("<b>"));
}

#[test]
fn control_characters_do_not_break_the_stamp() {
    let synth = PlaceholderSynthesizer::default();
    for prompt in ["Title\u{1b}[1m bold", "plain\u{7} bell"] {
        let frame = synth.render_frame(prompt, canvas()).unwrap();
        assert_eq!(frame.canvas(), canvas());
    }

    let svg = build_stamp_svg("a\u{1b}b\u{7}c", canvas(), &PlaceholderOpts::default());
    assert!(svg.contains(">abc<"), "{svg}");
    assert!(!svg.chars().any(|c| c.is_control()));
}

#[test]
fn opts_deserialize_with_defaults() {
    let opts: PlaceholderOpts =
        serde_json::from_str(r##"{"style":"solid_color","background":"#000000"}"##).unwrap();
    assert_eq!(opts.style, PlaceholderStyle::SolidColor);
    assert_eq!(opts.background, Rgb8::BLACK);
    assert_eq!(opts.foreground, Rgb8::BLACK);
    assert!(serde_json::from_str::<PlaceholderOpts>(r#"{"bogus":1}"#).is_err());
}
