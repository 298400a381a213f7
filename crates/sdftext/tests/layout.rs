// this_file: crates/sdftext/tests/layout.rs

mod common;

use std::sync::Arc;

use common::{font, lay_out, registry};
use sdftext::prelude::*;
use sdftext::GlyphKey;

const EPSILON: f32 = 1e-5;

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

#[test]
fn second_glyph_follows_first_advance() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let layout = lay_out(&mut font, "AB", Justification::Left, 100.0);

    let glyphs = layout.glyphs();
    assert_eq!(glyphs.len(), 2);
    assert!(close(glyphs[0].position.x, 0.0));
    assert!(close(glyphs[1].position.x, glyphs[0].position.x + 0.5));
    assert!(close(glyphs[0].position.y, glyphs[1].position.y));

    // 12x18 px glyph in a 24 px cell, padded by the 4 px window on each side
    let geometry = glyphs[0].geometry;
    assert!(close(geometry.width(), 20.0 / 24.0));
    assert!(close(geometry.height(), 26.0 / 24.0));
    assert!(geometry.min.y < 0.0, "glyphs rise above the baseline");

    assert_eq!(layout.lines().len(), 1);
    let line = layout.lines()[0];
    assert_eq!((line.start, line.count), (0, 2));
    assert!(layout.bounds().is_valid());
}

#[test]
fn texture_coordinates_point_at_cached_cells() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let layout = lay_out(&mut font, "AB", Justification::Left, 100.0);

    let info = font.get_or_render(&mut (), 0, 'B' as u32).unwrap();
    assert_eq!(layout.glyphs()[1].tex_coords, font.texture_bounds(&info));
    assert_eq!(layout.glyphs()[1].mip_level, info.position.mip_level);
}

#[test]
fn whitespace_takes_room_but_is_not_drawn() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let layout = lay_out(&mut font, "A B", Justification::Left, 100.0);

    let glyphs = layout.glyphs();
    assert!(glyphs[1].is_empty());
    assert!(!glyphs[1].is_hidden());
    assert!(close(glyphs[2].position.x, 1.0));
    assert!(!font.cache().contains(GlyphKey::new(0, ' ' as u32)));
}

#[test]
fn long_lines_wrap_at_word_starts() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let layout = lay_out(&mut font, "aa bb", Justification::Left, 1.2);

    let glyphs = layout.glyphs();
    assert!(glyphs[2].is_hidden(), "space at the wrap is hidden");
    assert!(close(glyphs[3].position.x, 0.0));
    assert!(close(glyphs[3].position.y, 1.0));
    assert!(close(glyphs[4].position.x, 0.5));

    let lines: Vec<(usize, usize)> = layout.lines().iter().map(|l| (l.start, l.count)).collect();
    assert_eq!(lines, vec![(0, 2), (3, 2)]);
}

#[test]
fn first_word_never_wraps() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let layout = lay_out(&mut font, "abcdefghij", Justification::Left, 0.1);

    assert_eq!(layout.lines().len(), 1);
    assert!(layout.glyphs().iter().all(|glyph| !glyph.is_hidden()));
    assert!(close(layout.glyphs()[9].position.x, 4.5));
}

#[test]
fn newlines_start_new_lines() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let layout = lay_out(&mut font, "a\nb", Justification::Left, 100.0);

    let glyphs = layout.glyphs();
    assert!(close(glyphs[2].position.x, 0.0));
    assert!(close(glyphs[2].position.y, 1.0));

    let lines: Vec<(usize, usize)> = layout.lines().iter().map(|l| (l.start, l.count)).collect();
    assert_eq!(lines, vec![(0, 2), (2, 1)]);
}

#[test]
fn spaces_before_a_newline_are_hidden() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let layout = lay_out(&mut font, "ab  \ncd", Justification::Left, 100.0);

    let glyphs = layout.glyphs();
    assert!(glyphs[2].is_hidden());
    assert!(glyphs[3].is_hidden());
    assert!(!glyphs[4].is_hidden(), "the newline itself stays");
    assert!(close(glyphs[5].position.x, 0.0));
    assert!(close(glyphs[5].position.y, 1.0));

    let lines: Vec<(usize, usize)> = layout.lines().iter().map(|l| (l.start, l.count)).collect();
    assert_eq!(lines, vec![(0, 5), (5, 2)]);
}

#[test]
fn whitespace_only_lines_are_kept() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let layout = lay_out(&mut font, "a\n \nb", Justification::Right, 100.0);

    assert!(!layout.glyphs()[2].is_hidden());
    let lines: Vec<(usize, usize)> = layout.lines().iter().map(|l| (l.start, l.count)).collect();
    assert_eq!(lines, vec![(0, 2), (2, 2), (4, 1)]);
    assert!(close(layout.glyphs()[4].position.y, 2.0));
}

#[test]
fn trailing_whitespace_does_not_move_justified_lines() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);

    for justification in [Justification::Right, Justification::Center] {
        let bare = lay_out(&mut font, "ab", justification, 100.0);
        let padded = lay_out(&mut font, "ab   ", justification, 100.0);
        assert!(close(bare.glyphs()[0].position.x, padded.glyphs()[0].position.x));
        assert!(close(bare.glyphs()[1].position.x, padded.glyphs()[1].position.x));
    }

    let right = lay_out(&mut font, "ab \ncd", Justification::Right, 100.0);
    let right_edge = |index: usize| {
        let glyph = right.glyphs()[index];
        glyph.position.x + glyph.geometry.max.x
    };
    assert!(close(right_edge(1), 0.0));
    assert!(close(right_edge(5), 0.0));
    for line in right.lines() {
        assert!(close(line.bounds.max.x, 0.0));
    }
}

#[test]
fn line_spacing_follows_style_scale() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let text = Arc::new(Text::create(&font, "a\nb", Segmentation::Script).unwrap());
    let mut layout = TextLayout::new(text, &[TextStyle::new(0, 3, 2.0)]).unwrap();
    layout
        .layout(&mut font, &mut (), Justification::Left, 100.0, 1.5)
        .unwrap();

    assert!(close(layout.glyphs()[2].position.y, 3.0));
    // 12 px glyph doubled, plus twice the doubled window padding
    assert!(close(layout.glyphs()[0].geometry.width(), 40.0 / 24.0));
}

#[test]
fn styles_apply_per_character() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let text = Arc::new(Text::create(&font, "AB", Segmentation::Script).unwrap());
    let styles = [TextStyle::new(0, 1, 1.0), TextStyle::new(1, 1, 2.0)];
    let mut layout = TextLayout::new(text, &styles).unwrap();
    layout
        .layout(&mut font, &mut (), Justification::Left, 100.0, 1.0)
        .unwrap();

    let glyphs = layout.glyphs();
    assert_eq!(glyphs[0].style_index, 0);
    assert_eq!(glyphs[1].style_index, 1);
    assert!(close(glyphs[1].position.x, 0.5));
    assert!(close(glyphs[1].geometry.width(), 2.0 * glyphs[0].geometry.width()));
}

#[test]
fn styles_must_cover_the_text() {
    let registry = registry();
    let font = font(&registry, &["mock"]);
    let text = Arc::new(Text::create(&font, "AB", Segmentation::Script).unwrap());

    let err = TextLayout::new(Arc::clone(&text), &[TextStyle::new(0, 1, 1.0)])
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let gap = [TextStyle::new(0, 1, 1.0), TextStyle::new(2, 1, 1.0)];
    assert!(TextLayout::new(Arc::clone(&text), &gap).is_err());
    assert!(TextLayout::new(text, &[]).is_err());
}

#[test]
fn justification_only_shifts_lines() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);

    let left = lay_out(&mut font, "ab cd\nefg", Justification::Left, 100.0);
    for justification in [Justification::Right, Justification::Center, Justification::End] {
        let other = lay_out(&mut font, "ab cd\nefg", justification, 100.0);
        assert_eq!(other.lines().len(), left.lines().len());

        for (a, b) in left.glyphs().iter().zip(other.glyphs()) {
            assert!(close(a.position.y, b.position.y));
            assert_eq!(a.geometry, b.geometry);
        }
        for window in [0..5, 6..9] {
            let shift = left.glyphs()[window.start].position.x
                - other.glyphs()[window.start].position.x;
            for index in window {
                let delta = left.glyphs()[index].position.x - other.glyphs()[index].position.x;
                assert!(close(delta, shift));
            }
        }
    }

    let start = lay_out(&mut font, "ab cd\nefg", Justification::Start, 100.0);
    assert_eq!(start.glyphs(), left.glyphs());

    let right = lay_out(&mut font, "ab cd\nefg", Justification::Right, 100.0);
    for line in right.lines() {
        assert!(close(line.bounds.max.x, 0.0));
    }
}

#[test]
fn backward_runs_fill_from_their_far_end() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let layout = lay_out(&mut font, "abc אבג", Justification::Left, 100.0);

    let glyphs = layout.glyphs();
    assert!(close(glyphs[3].position.x, 1.5));
    assert!(close(glyphs[4].position.x, 3.0));
    assert!(close(glyphs[5].position.x, 2.5));
    assert!(close(glyphs[6].position.x, 2.0));
}

#[test]
fn start_aligns_right_to_left_text_right() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let layout = lay_out(&mut font, "אבג", Justification::Start, 100.0);

    let glyphs = layout.glyphs();
    assert!(glyphs[0].position.x > glyphs[1].position.x);
    assert!(glyphs[1].position.x > glyphs[2].position.x);
    assert!(close(layout.lines()[0].bounds.max.x, 0.0));
}

#[test]
fn empty_text_lays_out_to_nothing() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let layout = lay_out(&mut font, "", Justification::Left, 100.0);

    assert!(layout.glyphs().is_empty());
    assert!(layout.lines().is_empty());
    assert!(!layout.bounds().is_valid());
}

#[test]
fn texts_only_lay_out_with_their_own_font() {
    let registry = registry();
    let shaping_font = font(&registry, &["mock"]);
    let mut other_font = font(&registry, &["mock"]);

    let text = Arc::new(Text::create(&shaping_font, "AB", Segmentation::Script).unwrap());
    let mut layout = TextLayout::new(text, &[TextStyle::new(0, 2, 1.0)]).unwrap();

    let err = layout
        .layout(&mut other_font, &mut (), Justification::Left, 100.0, 1.0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(layout.lines().is_empty());
}

#[test]
fn refresh_restores_evicted_glyphs() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let mut layout = lay_out(&mut font, "AB", Justification::Left, 100.0);
    let positions: Vec<_> = layout.glyphs().iter().map(|glyph| glyph.position).collect();

    let capacity = font.cache().capacity() as u32;
    for glyph in 1000..1000 + capacity {
        font.get_or_render(&mut (), 0, glyph).unwrap();
    }
    assert!(!font.cache().contains(GlyphKey::new(0, 'A' as u32)));

    layout.refresh(&mut font, &mut ()).unwrap();
    assert!(font.cache().contains(GlyphKey::new(0, 'A' as u32)));

    let info = font.get_or_render(&mut (), 0, 'A' as u32).unwrap();
    assert_eq!(layout.glyphs()[0].tex_coords, font.texture_bounds(&info));
    let refreshed: Vec<_> = layout.glyphs().iter().map(|glyph| glyph.position).collect();
    assert_eq!(refreshed, positions);
}

#[test]
fn refresh_range_is_bounds_checked() {
    let registry = registry();
    let mut font = font(&registry, &["mock"]);
    let mut layout = lay_out(&mut font, "AB", Justification::Left, 100.0);

    let err = layout.refresh_range(&mut font, &mut (), 1, 5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(layout.refresh_range(&mut font, &mut (), 1, 1).is_ok());
}
