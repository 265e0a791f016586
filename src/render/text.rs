use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

use crate::assets::fonts::FontBook;
use crate::foundation::core::Size;
use crate::scene::layer::{FontStyle, TextAlign, TextLayer};

/// Stateful helper that shapes layer text with Parley against a [`FontBook`].
pub(crate) struct TextEngine {
    book: FontBook,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
}

impl TextEngine {
    /// Register every face of `book` with a fresh Parley font context.
    pub(crate) fn new(book: FontBook) -> Self {
        let mut font_ctx = parley::FontContext::default();
        let mut seen = HashSet::new();
        for face in book.faces() {
            if seen.insert(Arc::as_ptr(&face.data)) {
                font_ctx.collection.register_fonts(
                    parley::fontique::Blob::from(face.data.as_ref().clone()),
                    None,
                );
            }
        }
        Self {
            book,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    pub(crate) fn book(&self) -> &FontBook {
        &self.book
    }

    /// Registered family that will stand in for the layer's requested one.
    pub(crate) fn family_for(&self, layer: &TextLayer) -> Option<String> {
        let italic = layer.font_style == FontStyle::Italic;
        let idx = self
            .book
            .resolve(&layer.font_family, f32::from(layer.font_weight), italic)?;
        self.book.face(idx).map(|f| f.family.clone())
    }

    /// Shape and align the layer's text. `None` when no font is available.
    pub(crate) fn layout(&mut self, layer: &TextLayer) -> Option<parley::Layout<()>> {
        use parley::style::StyleProperty as P;

        let family = self.family_for(layer)?;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &layer.text, 1.0, true);
        builder.push_default(P::FontStack(parley::style::FontStack::Source(Cow::Owned(
            family,
        ))));
        builder.push_default(P::FontSize(layer.font_size as f32));
        builder.push_default(P::FontWeight(parley::style::FontWeight::new(f32::from(
            layer.font_weight,
        ))));
        builder.push_default(P::FontStyle(match layer.font_style {
            FontStyle::Normal => parley::style::FontStyle::Normal,
            FontStyle::Italic => parley::style::FontStyle::Italic,
        }));
        builder.push_default(P::LetterSpacing(layer.letter_spacing as f32));
        builder.push_default(P::LineHeight(parley::style::LineHeight::FontSizeRelative(
            layer.line_height as f32,
        )));

        let mut layout: parley::Layout<()> = builder.build(&layer.text);
        layout.break_all_lines(None);
        let alignment = match layer.align {
            TextAlign::Left => parley::Alignment::Start,
            TextAlign::Center => parley::Alignment::Center,
            TextAlign::Right => parley::Alignment::End,
        };
        layout.align(None, alignment, parley::AlignmentOptions::default());
        Some(layout)
    }
}

/// Box size of a shaped layout, never smaller than half an em wide or one line high.
pub(crate) fn layout_box(layout: &parley::Layout<()>, layer: &TextLayer) -> Size {
    let min_w = layer.font_size * 0.5;
    let min_h = layer.font_size * layer.line_height;
    Size::new(
        f64::from(layout.width()).max(min_w),
        f64::from(layout.height()).max(min_h),
    )
}
