use anyhow::Result;
use fontdue::{Font, FontSettings, LineMetrics, Metrics};
use softbuffer::{Context, Surface};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::Window;

use anuencia::cli::Cli;
use anuencia::commands::{Cmd, MenuAction, MenuEntry, ToolbarEntry, MENUS, TOOLBAR};
use anuencia::messages::{AppMsg, Direction, DocumentMsg, EditorMsg, ModalMsg, Msg, UiMsg};
use anuencia::model::{
    Modal, UnsavedChoice, BASE_TITLE, MENU_BAR_HEIGHT, TEXT_AREA_PADDING_PX, TOOLBAR_HEIGHT,
};
use anuencia::update::update;
use anuencia::{logging, pdf, AppModel};

// Glyph cache key: (character, font_size as bits)
type GlyphCacheKey = (char, u32);
type GlyphCache = HashMap<GlyphCacheKey, (Metrics, Vec<u8>)>;

// ============================================================================
// FONT DISCOVERY
// ============================================================================

/// Well-known monospace font locations, tried in order
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/System/Library/Fonts/Monaco.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// Find a usable monospace font on this system, returning its raw bytes.
///
/// The same bytes are embedded into exported PDFs so print output matches
/// the editor.
fn load_system_font() -> Result<Vec<u8>> {
    for candidate in FONT_CANDIDATES {
        let Ok(data) = std::fs::read(candidate) else {
            continue;
        };
        if Font::from_bytes(data.as_slice(), FontSettings::default()).is_ok() {
            tracing::info!("Using font {}", candidate);
            return Ok(data);
        }
        tracing::warn!("Font at {} failed to parse, skipping", candidate);
    }
    anyhow::bail!("No usable monospace font found on this system")
}

// ============================================================================
// LAYOUT (shared between rendering and hit testing)
// ============================================================================

const MENU_TITLE_PADDING_PX: f32 = 12.0;
const TOOLBAR_BUTTON_PADDING_PX: f32 = 10.0;
const TOOLBAR_SEPARATOR_WIDTH_PX: f32 = 9.0;
const DROPDOWN_ITEM_HEIGHT: usize = 24;
const DROPDOWN_SEPARATOR_HEIGHT: usize = 7;

const MODAL_WIDTH: usize = 480;
const MODAL_BUTTON_WIDTH: usize = 110;
const MODAL_BUTTON_HEIGHT: usize = 30;
const MODAL_BUTTON_GAP: usize = 12;

/// Horizontal span (x, width) of each menu title in the menu bar
fn menu_title_spans(char_width: f32) -> Vec<(f32, f32)> {
    let mut spans = Vec::with_capacity(MENUS.len());
    let mut x = 4.0;
    for menu in MENUS {
        let width = menu.title.chars().count() as f32 * char_width + 2.0 * MENU_TITLE_PADDING_PX;
        spans.push((x, width));
        x += width;
    }
    spans
}

/// Horizontal span (x, width) of each toolbar entry
fn toolbar_spans(char_width: f32) -> Vec<(f32, f32)> {
    let mut spans = Vec::with_capacity(TOOLBAR.len());
    let mut x = 4.0;
    for entry in TOOLBAR {
        let width = match entry {
            ToolbarEntry::Button { label, .. } => {
                label.chars().count() as f32 * char_width + 2.0 * TOOLBAR_BUTTON_PADDING_PX
            }
            ToolbarEntry::Separator => TOOLBAR_SEPARATOR_WIDTH_PX,
        };
        spans.push((x, width));
        x += width + 4.0;
    }
    spans
}

/// Pixel width of an open dropdown
fn dropdown_width(menu_index: usize, char_width: f32) -> f32 {
    let mut max_chars = 0usize;
    for entry in MENUS[menu_index].entries {
        if let MenuEntry::Item {
            label, shortcut, ..
        } = entry
        {
            let chars = label.chars().count() + shortcut.map_or(0, |s| s.chars().count() + 4);
            max_chars = max_chars.max(chars);
        }
    }
    max_chars as f32 * char_width + 2.0 * MENU_TITLE_PADDING_PX
}

/// Top y of each dropdown entry, plus total height
fn dropdown_entry_offsets(menu_index: usize) -> (Vec<usize>, usize) {
    let mut offsets = Vec::new();
    let mut y = MENU_BAR_HEIGHT + 2;
    for entry in MENUS[menu_index].entries {
        offsets.push(y);
        y += match entry {
            MenuEntry::Item { .. } => DROPDOWN_ITEM_HEIGHT,
            MenuEntry::Separator => DROPDOWN_SEPARATOR_HEIGHT,
        };
    }
    (offsets, y - MENU_BAR_HEIGHT - 2)
}

/// Menu title under the pointer, if any
fn menu_bar_hit(x: f64, y: f64, char_width: f32) -> Option<usize> {
    if y < 0.0 || y >= MENU_BAR_HEIGHT as f64 {
        return None;
    }
    for (i, (start, width)) in menu_title_spans(char_width).iter().enumerate() {
        if x >= *start as f64 && x < (*start + *width) as f64 {
            return Some(i);
        }
    }
    None
}

/// Dropdown entry index under the pointer (separators are not hits)
fn dropdown_hit(menu_index: usize, x: f64, y: f64, char_width: f32) -> Option<usize> {
    let (menu_x, _) = menu_title_spans(char_width)[menu_index];
    let width = dropdown_width(menu_index, char_width);
    if x < menu_x as f64 || x >= (menu_x + width) as f64 {
        return None;
    }
    let (offsets, _) = dropdown_entry_offsets(menu_index);
    for (i, entry) in MENUS[menu_index].entries.iter().enumerate() {
        if let MenuEntry::Item { .. } = entry {
            let top = offsets[i] as f64;
            if y >= top && y < top + DROPDOWN_ITEM_HEIGHT as f64 {
                return Some(i);
            }
        }
    }
    None
}

/// Toolbar action under the pointer, if any
fn toolbar_hit(x: f64, y: f64, char_width: f32) -> Option<MenuAction> {
    let top = MENU_BAR_HEIGHT as f64;
    if y < top || y >= (MENU_BAR_HEIGHT + TOOLBAR_HEIGHT) as f64 {
        return None;
    }
    for (entry, (start, width)) in TOOLBAR.iter().zip(toolbar_spans(char_width)) {
        if let ToolbarEntry::Button { action, .. } = entry {
            if x >= start as f64 && x < (start + width) as f64 {
                return Some(*action);
            }
        }
    }
    None
}

/// Top-left corner of the modal box
fn modal_origin(window_size: (u32, u32), height: usize) -> (usize, usize) {
    let x = (window_size.0 as usize).saturating_sub(MODAL_WIDTH) / 2;
    let y = (window_size.1 as usize).saturating_sub(height) / 2;
    (x, y)
}

fn modal_height(modal: &Modal) -> usize {
    match modal {
        Modal::UnsavedChanges { .. } => 140,
        Modal::CityPrompt(_) | Modal::FontSizePrompt(_) => 150,
        Modal::Error { message, .. } => 110 + message.lines().count() * 20,
        Modal::About => 170,
    }
}

/// Button rects for the open modal: (x, y, w, h, message-on-click)
fn modal_button_rects(
    modal: &Modal,
    window_size: (u32, u32),
) -> Vec<(usize, usize, usize, usize, ModalMsg)> {
    let height = modal_height(modal);
    let (mx, my) = modal_origin(window_size, height);
    let button_y = my + height - MODAL_BUTTON_HEIGHT - 14;

    let labels: usize = match modal {
        Modal::UnsavedChanges { .. } => 3,
        Modal::CityPrompt(_) | Modal::FontSizePrompt(_) => 2,
        Modal::Error { .. } | Modal::About => 1,
    };

    let total = labels * MODAL_BUTTON_WIDTH + (labels - 1) * MODAL_BUTTON_GAP;
    let start_x = mx + MODAL_WIDTH.saturating_sub(total) / 2;

    (0..labels)
        .map(|i| {
            let x = start_x + i * (MODAL_BUTTON_WIDTH + MODAL_BUTTON_GAP);
            // Last button is the dismissing one on two-button prompts
            let msg = match modal {
                Modal::UnsavedChanges { .. } => ModalMsg::Confirm,
                Modal::CityPrompt(_) | Modal::FontSizePrompt(_) => {
                    if i == 0 {
                        ModalMsg::Confirm
                    } else {
                        ModalMsg::Cancel
                    }
                }
                _ => ModalMsg::Confirm,
            };
            (x, button_y, MODAL_BUTTON_WIDTH, MODAL_BUTTON_HEIGHT, msg)
        })
        .collect()
}

/// Modal button under the pointer: its index and the message it dispatches
fn modal_click_hit(modal: &Modal, window_size: (u32, u32), x: f64, y: f64) -> Option<(usize, ModalMsg)> {
    modal_button_rects(modal, window_size)
        .into_iter()
        .enumerate()
        .find(|(_, (bx, by, bw, bh, _))| {
            x >= *bx as f64 && x < (bx + bw) as f64 && y >= *by as f64 && y < (by + bh) as f64
        })
        .map(|(i, (_, _, _, _, msg))| (i, msg))
}

// ============================================================================
// RENDERER
// ============================================================================

struct Renderer {
    font: Font,
    surface: Surface<Rc<Window>, Rc<Window>>,
    width: u32,
    height: u32,
    scale_factor: f32,
    /// Physical font size (points scaled for HiDPI)
    font_size: f32,
    line_metrics: LineMetrics,
    glyph_cache: GlyphCache,
    char_width: f32,
}

impl Renderer {
    fn new(
        window: Rc<Window>,
        context: &Context<Rc<Window>>,
        font_data: &[u8],
        base_font_size: f32,
    ) -> Result<Self> {
        let scale_factor = window.scale_factor() as f32;
        let (width, height) = {
            let size = window.inner_size();
            (size.width, size.height)
        };

        let surface = Surface::new(context, Rc::clone(&window))
            .map_err(|e| anyhow::anyhow!("Failed to create surface: {}", e))?;

        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| anyhow::anyhow!("Failed to load font: {}", e))?;

        let font_size = base_font_size * scale_factor;
        let line_metrics = font
            .horizontal_line_metrics(font_size)
            .ok_or_else(|| anyhow::anyhow!("Font missing horizontal line metrics"))?;

        // Use 'M' as the advance reference for monospace positioning
        let (metrics, _) = font.rasterize('M', font_size);
        let char_width = metrics.advance_width;

        Ok(Self {
            font,
            surface,
            width,
            height,
            scale_factor,
            font_size,
            line_metrics,
            glyph_cache: HashMap::new(),
            char_width,
        })
    }

    fn char_width(&self) -> f32 {
        self.char_width
    }

    fn line_height(&self) -> usize {
        self.line_metrics.new_line_size.ceil() as usize
    }

    /// Re-derive metrics after a font size change; drops the glyph cache
    fn set_font_size(&mut self, base_font_size: f32) {
        self.font_size = base_font_size * self.scale_factor;
        if let Some(metrics) = self.font.horizontal_line_metrics(self.font_size) {
            self.line_metrics = metrics;
        }
        let (metrics, _) = self.font.rasterize('M', self.font_size);
        self.char_width = metrics.advance_width;
        self.glyph_cache.clear();
    }

    fn render(&mut self, model: &mut AppModel) -> Result<()> {
        // Pick up font size changes made through the UI
        if (model.font_size * self.scale_factor - self.font_size).abs() > 0.01 {
            self.set_font_size(model.font_size);
            model.set_font_metrics(self.char_width, self.line_height());
        }

        if self.width != model.window_size.0 || self.height != model.window_size.1 {
            self.width = model.window_size.0.max(1);
            self.height = model.window_size.1.max(1);
            self.surface
                .resize(
                    NonZeroU32::new(self.width).unwrap(),
                    NonZeroU32::new(self.height).unwrap(),
                )
                .map_err(|e| anyhow::anyhow!("Failed to resize surface: {}", e))?;
        }

        let width = self.width;
        let height = self.height;
        let line_height = self.line_height();
        let font_size = self.font_size;
        let ascent = self.line_metrics.ascent;
        let char_width = self.char_width;

        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|e| anyhow::anyhow!("Failed to get surface buffer: {}", e))?;

        buffer.fill(model.theme.editor.background.to_argb_u32());

        Self::render_text_area(
            &mut buffer,
            model,
            &self.font,
            &mut self.glyph_cache,
            font_size,
            ascent,
            line_height,
            char_width,
            width,
            height,
        );

        Self::render_chrome(
            &mut buffer,
            model,
            &self.font,
            &mut self.glyph_cache,
            font_size,
            ascent,
            char_width,
            width,
            height,
        );

        Self::render_status_bar(
            &mut buffer,
            model,
            &self.font,
            &mut self.glyph_cache,
            font_size,
            ascent,
            line_height,
            char_width,
            width,
            height,
        );

        if let Some(modal) = model.ui.modal.clone() {
            Self::render_modal(
                &mut buffer,
                model,
                &modal,
                &self.font,
                &mut self.glyph_cache,
                font_size,
                ascent,
                char_width,
                width,
                height,
            );
        }

        buffer
            .present()
            .map_err(|e| anyhow::anyhow!("Failed to present buffer: {}", e))?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn render_text_area(
        buffer: &mut [u32],
        model: &AppModel,
        font: &Font,
        glyph_cache: &mut GlyphCache,
        font_size: f32,
        ascent: f32,
        line_height: usize,
        char_width: f32,
        width: u32,
        height: u32,
    ) {
        let top = model.text_area_top();
        let viewport = model.editor.viewport;
        let text_x = TEXT_AREA_PADDING_PX.round() as usize;
        let fg = model.theme.editor.foreground.to_argb_u32();
        let current_line_bg = model.theme.editor.current_line_background.to_argb_u32();
        let selection_bg = model.theme.editor.selection_background.to_argb_u32();

        let selection = model.editor.selection;
        let sel_range = if selection.is_empty() {
            None
        } else {
            Some((selection.start(), selection.end()))
        };

        for row in 0..viewport.visible_lines {
            let line_idx = viewport.top_line + row;
            if line_idx >= model.document.line_count() {
                break;
            }
            let y = top + row * line_height;
            if y + line_height > height as usize {
                break;
            }

            // Current line highlight under everything else
            if line_idx == model.editor.cursor.line && sel_range.is_none() {
                fill_rect(buffer, width, height, 0, y, width as usize, line_height, current_line_bg);
            }

            let line = model.document.get_line(line_idx).unwrap_or_default();
            let line_len = model.document.line_length(line_idx);

            // Selection highlight for the visible slice of this line
            if let Some((start, end)) = sel_range {
                if line_idx >= start.line && line_idx <= end.line {
                    let sel_from = if line_idx == start.line { start.column } else { 0 };
                    let sel_to = if line_idx == end.line { end.column } else { line_len + 1 };
                    let from = sel_from.max(viewport.left_column);
                    let to = sel_to.min(viewport.left_column + viewport.visible_columns + 1);
                    if to > from {
                        let x0 = text_x
                            + ((from - viewport.left_column) as f32 * char_width).round() as usize;
                        let w = ((to - from) as f32 * char_width).round() as usize;
                        fill_rect(buffer, width, height, x0, y, w, line_height, selection_bg);
                    }
                }
            }

            let visible: String = line
                .chars()
                .take(line_len)
                .skip(viewport.left_column)
                .take(viewport.visible_columns + 1)
                .collect();
            draw_text(
                buffer,
                font,
                glyph_cache,
                font_size,
                ascent,
                width,
                height,
                text_x,
                y,
                &visible,
                fg,
            );
        }

        // Cursor caret
        if model.ui.cursor_visible && !model.ui.modal_active() {
            let cursor = model.editor.cursor;
            if cursor.line >= viewport.top_line
                && cursor.line < viewport.top_line + viewport.visible_lines
                && cursor.column >= viewport.left_column
            {
                let cx = text_x
                    + ((cursor.column - viewport.left_column) as f32 * char_width).round() as usize;
                let cy = top + (cursor.line - viewport.top_line) * line_height;
                let caret = model.theme.editor.cursor_color.to_argb_u32();
                fill_rect(buffer, width, height, cx, cy, 2, line_height, caret);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_chrome(
        buffer: &mut [u32],
        model: &AppModel,
        font: &Font,
        glyph_cache: &mut GlyphCache,
        font_size: f32,
        ascent: f32,
        char_width: f32,
        width: u32,
        height: u32,
    ) {
        let chrome_bg = model.theme.chrome.background.to_argb_u32();
        let chrome_fg = model.theme.chrome.foreground.to_argb_u32();
        let hover_bg = model.theme.chrome.hover_background.to_argb_u32();
        let border = model.theme.chrome.border_color.to_argb_u32();

        // Menu bar + toolbar backgrounds
        fill_rect(buffer, width, height, 0, 0, width as usize, MENU_BAR_HEIGHT, chrome_bg);
        fill_rect(
            buffer,
            width,
            height,
            0,
            MENU_BAR_HEIGHT,
            width as usize,
            TOOLBAR_HEIGHT,
            chrome_bg,
        );
        fill_rect(
            buffer,
            width,
            height,
            0,
            MENU_BAR_HEIGHT + TOOLBAR_HEIGHT - 1,
            width as usize,
            1,
            border,
        );

        // Menu titles
        for (i, ((x, w), menu)) in menu_title_spans(char_width).iter().zip(MENUS).enumerate() {
            if model.ui.open_menu == Some(i) {
                fill_rect(
                    buffer,
                    width,
                    height,
                    *x as usize,
                    0,
                    *w as usize,
                    MENU_BAR_HEIGHT,
                    hover_bg,
                );
            }
            draw_text(
                buffer,
                font,
                glyph_cache,
                font_size,
                ascent,
                width,
                height,
                (*x + MENU_TITLE_PADDING_PX) as usize,
                4,
                menu.title,
                chrome_fg,
            );
        }

        // Toolbar
        for (entry, (x, w)) in TOOLBAR.iter().zip(toolbar_spans(char_width)) {
            match entry {
                ToolbarEntry::Button { label, .. } => {
                    fill_rect(
                        buffer,
                        width,
                        height,
                        x as usize,
                        MENU_BAR_HEIGHT + 3,
                        w as usize,
                        TOOLBAR_HEIGHT - 7,
                        hover_bg,
                    );
                    draw_text(
                        buffer,
                        font,
                        glyph_cache,
                        font_size,
                        ascent,
                        width,
                        height,
                        (x + TOOLBAR_BUTTON_PADDING_PX) as usize,
                        MENU_BAR_HEIGHT + 6,
                        label,
                        chrome_fg,
                    );
                }
                ToolbarEntry::Separator => {
                    fill_rect(
                        buffer,
                        width,
                        height,
                        (x + TOOLBAR_SEPARATOR_WIDTH_PX / 2.0) as usize,
                        MENU_BAR_HEIGHT + 4,
                        1,
                        TOOLBAR_HEIGHT - 8,
                        border,
                    );
                }
            }
        }

        // Open dropdown
        if let Some(menu_index) = model.ui.open_menu {
            let (menu_x, _) = menu_title_spans(char_width)[menu_index];
            let dd_width = dropdown_width(menu_index, char_width) as usize;
            let (offsets, dd_height) = dropdown_entry_offsets(menu_index);

            fill_rect(
                buffer,
                width,
                height,
                menu_x as usize,
                MENU_BAR_HEIGHT,
                dd_width,
                dd_height + 4,
                chrome_bg,
            );
            stroke_rect(
                buffer,
                width,
                height,
                menu_x as usize,
                MENU_BAR_HEIGHT,
                dd_width,
                dd_height + 4,
                border,
            );

            for (i, entry) in MENUS[menu_index].entries.iter().enumerate() {
                let y = offsets[i];
                match entry {
                    MenuEntry::Item {
                        label, shortcut, ..
                    } => {
                        if model.ui.menu_hover == Some(i) {
                            fill_rect(
                                buffer,
                                width,
                                height,
                                menu_x as usize + 1,
                                y,
                                dd_width - 2,
                                DROPDOWN_ITEM_HEIGHT,
                                hover_bg,
                            );
                        }
                        draw_text(
                            buffer,
                            font,
                            glyph_cache,
                            font_size,
                            ascent,
                            width,
                            height,
                            (menu_x + MENU_TITLE_PADDING_PX) as usize,
                            y + 3,
                            label,
                            chrome_fg,
                        );
                        if let Some(shortcut) = shortcut {
                            let sc_x = menu_x as usize + dd_width
                                - MENU_TITLE_PADDING_PX as usize
                                - (shortcut.chars().count() as f32 * char_width).round() as usize;
                            draw_text(
                                buffer,
                                font,
                                glyph_cache,
                                font_size,
                                ascent,
                                width,
                                height,
                                sc_x,
                                y + 3,
                                shortcut,
                                chrome_fg,
                            );
                        }
                    }
                    MenuEntry::Separator => {
                        fill_rect(
                            buffer,
                            width,
                            height,
                            menu_x as usize + 4,
                            y + DROPDOWN_SEPARATOR_HEIGHT / 2,
                            dd_width.saturating_sub(8),
                            1,
                            border,
                        );
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_status_bar(
        buffer: &mut [u32],
        model: &AppModel,
        font: &Font,
        glyph_cache: &mut GlyphCache,
        font_size: f32,
        ascent: f32,
        line_height: usize,
        char_width: f32,
        width: u32,
        height: u32,
    ) {
        use anuencia::model::SegmentPosition;

        let bar_bg = model.theme.status_bar.background.to_argb_u32();
        let bar_fg = model.theme.status_bar.foreground.to_argb_u32();
        let bar_y = (height as usize).saturating_sub(line_height);

        fill_rect(buffer, width, height, 0, bar_y, width as usize, line_height, bar_bg);

        // Transient messages take over the left side while alive
        let left_text = match &model.ui.status_bar.transient {
            Some(msg) => msg.text.clone(),
            None => model
                .ui
                .status_bar
                .visible(SegmentPosition::Left)
                .map(|s| s.content.display_text().to_string())
                .collect::<Vec<_>>()
                .join("  |  "),
        };
        draw_text(
            buffer,
            font,
            glyph_cache,
            font_size,
            ascent,
            width,
            height,
            8,
            bar_y,
            &left_text,
            bar_fg,
        );

        let right_text = model
            .ui
            .status_bar
            .visible(SegmentPosition::Right)
            .map(|s| s.content.display_text().to_string())
            .collect::<Vec<_>>()
            .join("  ");
        let right_x = (width as f32
            - right_text.chars().count() as f32 * char_width
            - 8.0)
            .max(0.0) as usize;
        draw_text(
            buffer,
            font,
            glyph_cache,
            font_size,
            ascent,
            width,
            height,
            right_x,
            bar_y,
            &right_text,
            bar_fg,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn render_modal(
        buffer: &mut [u32],
        model: &AppModel,
        modal: &Modal,
        font: &Font,
        glyph_cache: &mut GlyphCache,
        font_size: f32,
        ascent: f32,
        char_width: f32,
        width: u32,
        height: u32,
    ) {
        let theme = &model.theme.modal;
        let box_height = modal_height(modal);
        let (mx, my) = modal_origin(model.window_size, box_height);

        fill_rect(buffer, width, height, mx, my, MODAL_WIDTH, box_height, theme.background.to_argb_u32());
        stroke_rect(buffer, width, height, mx, my, MODAL_WIDTH, box_height, theme.border_color.to_argb_u32());

        let fg = theme.foreground.to_argb_u32();
        let text_x = mx + 16;

        // (text, top offset, color) lines for this modal, input drawn separately
        let mut lines: Vec<(String, usize, u32)> = Vec::new();
        let mut input_field: Option<&anuencia::model::TextInputState> = None;

        match modal {
            Modal::UnsavedChanges { .. } => {
                lines.push(("Alterações não salvas".into(), 14, fg));
                lines.push((
                    "O documento foi modificado. Deseja salvar as alterações?".into(),
                    44,
                    fg,
                ));
            }
            Modal::CityPrompt(input) => {
                lines.push(("Definir Cidade Padrão".into(), 14, fg));
                lines.push(("Cidade para os novos cabeçalhos:".into(), 44, fg));
                input_field = Some(input);
            }
            Modal::FontSizePrompt(input) => {
                lines.push(("Fonte".into(), 14, fg));
                lines.push(("Tamanho da fonte (pontos):".into(), 44, fg));
                input_field = Some(input);
            }
            Modal::Error { title, message } => {
                lines.push((title.clone(), 14, theme.error.to_argb_u32()));
                for (i, line) in message.lines().enumerate() {
                    lines.push((line.to_string(), 44 + i * 20, fg));
                }
            }
            Modal::About => {
                lines.push(("Sobre o Editor".into(), 14, fg));
                lines.push(("Editor de Documentos - Lotes Rurais".into(), 44, fg));
                lines.push(("Editor para declarações de anuência de".into(), 68, fg));
                lines.push(("confrontantes de lotes rurais.".into(), 88, fg));
            }
        }

        for (text, offset, color) in &lines {
            draw_text(
                buffer,
                font,
                glyph_cache,
                font_size,
                ascent,
                width,
                height,
                text_x,
                my + offset,
                text,
                *color,
            );
        }

        if let Some(input) = input_field {
            Self::render_modal_input(
                buffer, model, input, font, glyph_cache, font_size, ascent, char_width, width,
                height, mx, my + 70,
            );
        }

        // Buttons
        let button_bg = theme.button_background.to_argb_u32();
        let focus_bg = theme.button_focus_background.to_argb_u32();
        let rects = modal_button_rects(modal, model.window_size);
        let labels: Vec<&str> = match modal {
            Modal::UnsavedChanges { .. } => {
                UnsavedChoice::ALL.iter().map(|c| c.label()).collect()
            }
            Modal::CityPrompt(_) | Modal::FontSizePrompt(_) => vec!["OK", "Cancelar"],
            Modal::Error { .. } | Modal::About => vec!["OK"],
        };
        for (i, ((bx, by, bw, bh, _), label)) in rects.iter().zip(&labels).enumerate() {
            let focused = match modal {
                Modal::UnsavedChanges { selected } => UnsavedChoice::ALL[i] == *selected,
                _ => i == 0,
            };
            let bg = if focused { focus_bg } else { button_bg };
            fill_rect(buffer, width, height, *bx, *by, *bw, *bh, bg);
            stroke_rect(
                buffer,
                width,
                height,
                *bx,
                *by,
                *bw,
                *bh,
                theme.border_color.to_argb_u32(),
            );
            let label_x =
                bx + (bw.saturating_sub((label.chars().count() as f32 * char_width) as usize)) / 2;
            draw_text(
                buffer,
                font,
                glyph_cache,
                font_size,
                ascent,
                width,
                height,
                label_x,
                by + 5,
                label,
                fg,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn render_modal_input(
        buffer: &mut [u32],
        model: &AppModel,
        input: &anuencia::model::TextInputState,
        font: &Font,
        glyph_cache: &mut GlyphCache,
        font_size: f32,
        ascent: f32,
        char_width: f32,
        width: u32,
        height: u32,
        mx: usize,
        y: usize,
    ) {
        let theme = &model.theme.modal;
        let field_x = mx + 16;
        let field_w = MODAL_WIDTH - 32;
        let field_h = 26;

        fill_rect(buffer, width, height, field_x, y, field_w, field_h, theme.input_background.to_argb_u32());
        stroke_rect(buffer, width, height, field_x, y, field_w, field_h, theme.border_color.to_argb_u32());
        draw_text(
            buffer,
            font,
            glyph_cache,
            font_size,
            ascent,
            width,
            height,
            field_x + 6,
            y + 3,
            &input.input,
            theme.foreground.to_argb_u32(),
        );

        // Input caret
        let caret_x = field_x + 6 + (input.cursor as f32 * char_width).round() as usize;
        fill_rect(
            buffer,
            width,
            height,
            caret_x,
            y + 3,
            1,
            field_h - 6,
            theme.foreground.to_argb_u32(),
        );
    }

    /// Map a pixel position inside the text area to a buffer position
    fn pixel_to_cursor(&self, x: f64, y: f64, model: &AppModel) -> (usize, usize) {
        let top = model.text_area_top() as f64;
        let line_height = self.line_height() as f64;
        let viewport = model.editor.viewport;

        let row = ((y - top).max(0.0) / line_height).floor() as usize;
        let line = (viewport.top_line + row).min(model.document.line_count().saturating_sub(1));

        let text_x = TEXT_AREA_PADDING_PX as f64;
        let col = ((x - text_x).max(0.0) / self.char_width as f64).round() as usize;
        let column = (viewport.left_column + col).min(model.document.line_length(line));

        (line, column)
    }
}

/// Fill a solid rectangle, clipped to the buffer
fn fill_rect(
    buffer: &mut [u32],
    buffer_width: u32,
    buffer_height: u32,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    color: u32,
) {
    let x_end = (x + w).min(buffer_width as usize);
    let y_end = (y + h).min(buffer_height as usize);
    for py in y..y_end {
        for px in x..x_end {
            buffer[py * buffer_width as usize + px] = color;
        }
    }
}

/// Draw a 1px rectangle outline, clipped to the buffer
fn stroke_rect(
    buffer: &mut [u32],
    buffer_width: u32,
    buffer_height: u32,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    color: u32,
) {
    fill_rect(buffer, buffer_width, buffer_height, x, y, w, 1, color);
    fill_rect(buffer, buffer_width, buffer_height, x, y + h.saturating_sub(1), w, 1, color);
    fill_rect(buffer, buffer_width, buffer_height, x, y, 1, h, color);
    fill_rect(buffer, buffer_width, buffer_height, x + w.saturating_sub(1), y, 1, h, color);
}

#[allow(clippy::too_many_arguments)]
fn draw_text(
    buffer: &mut [u32],
    font: &Font,
    glyph_cache: &mut GlyphCache,
    font_size: f32,
    ascent: f32,
    width: u32,
    height: u32,
    x: usize,
    y: usize, // line_top position
    text: &str,
    color: u32,
) {
    let mut current_x = x as f32;
    let baseline = y as f32 + ascent;

    for ch in text.chars() {
        let key = (ch, font_size.to_bits());
        if !glyph_cache.contains_key(&key) {
            let (metrics, bitmap) = font.rasterize(ch, font_size);
            glyph_cache.insert(key, (metrics, bitmap));
        }
        let (metrics, bitmap) = glyph_cache.get(&key).unwrap();

        // Position glyph for PositiveYDown coordinate system
        let glyph_top = baseline - metrics.height as f32 - metrics.ymin as f32;

        for bitmap_y in 0..metrics.height {
            for bitmap_x in 0..metrics.width {
                let bitmap_idx = bitmap_y * metrics.width + bitmap_x;
                if bitmap_idx < bitmap.len() {
                    let alpha = bitmap[bitmap_idx];
                    if alpha > 0 {
                        let px = current_x as isize + bitmap_x as isize + metrics.xmin as isize;
                        let py = (glyph_top + bitmap_y as f32) as isize;

                        if px >= 0
                            && py >= 0
                            && (px as usize) < width as usize
                            && (py as usize) < height as usize
                        {
                            let px = px as usize;
                            let py = py as usize;

                            // Blend the glyph with background based on alpha
                            let alpha_f = alpha as f32 / 255.0;
                            let bg_pixel = buffer[py * width as usize + px];

                            let bg_r = ((bg_pixel >> 16) & 0xFF) as f32;
                            let bg_g = ((bg_pixel >> 8) & 0xFF) as f32;
                            let bg_b = (bg_pixel & 0xFF) as f32;

                            let fg_r = ((color >> 16) & 0xFF) as f32;
                            let fg_g = ((color >> 8) & 0xFF) as f32;
                            let fg_b = (color & 0xFF) as f32;

                            let final_r = (bg_r * (1.0 - alpha_f) + fg_r * alpha_f) as u32;
                            let final_g = (bg_g * (1.0 - alpha_f) + fg_g * alpha_f) as u32;
                            let final_b = (bg_b * (1.0 - alpha_f) + fg_b * alpha_f) as u32;

                            buffer[py * width as usize + px] =
                                0xFF000000 | (final_r << 16) | (final_g << 8) | final_b;
                        }
                    }
                }
            }
        }

        current_x += metrics.advance_width;
    }
}

// ============================================================================
// INPUT HANDLING
// ============================================================================

fn handle_key(
    model: &mut AppModel,
    key: Key,
    ctrl: bool,
    shift: bool,
    logo: bool,
) -> Option<Cmd> {
    // Modals capture the keyboard while open
    if model.ui.modal_active() {
        return match key {
            Key::Named(NamedKey::Enter) => update(model, Msg::Ui(UiMsg::Modal(ModalMsg::Confirm))),
            Key::Named(NamedKey::Escape) => update(model, Msg::Ui(UiMsg::Modal(ModalMsg::Cancel))),
            Key::Named(NamedKey::Tab) if shift => {
                update(model, Msg::Ui(UiMsg::Modal(ModalMsg::FocusPrev)))
            }
            Key::Named(NamedKey::Tab) => update(model, Msg::Ui(UiMsg::Modal(ModalMsg::FocusNext))),
            Key::Named(NamedKey::ArrowLeft) => {
                update(model, Msg::Ui(UiMsg::Modal(ModalMsg::FocusPrev)))
            }
            Key::Named(NamedKey::ArrowRight) => {
                update(model, Msg::Ui(UiMsg::Modal(ModalMsg::FocusNext)))
            }
            Key::Named(NamedKey::Backspace) => {
                update(model, Msg::Ui(UiMsg::Modal(ModalMsg::DeleteBackward)))
            }
            Key::Named(NamedKey::Space) => {
                update(model, Msg::Ui(UiMsg::Modal(ModalMsg::InsertChar(' '))))
            }
            Key::Character(ref s) if !ctrl && !logo => {
                let mut cmd = None;
                for ch in s.chars() {
                    cmd = update(model, Msg::Ui(UiMsg::Modal(ModalMsg::InsertChar(ch))));
                }
                cmd
            }
            _ => None,
        };
    }

    // An open dropdown closes on Escape
    if model.ui.open_menu.is_some() {
        if let Key::Named(NamedKey::Escape) = key {
            return update(model, Msg::Ui(UiMsg::CloseMenu));
        }
    }

    match key {
        // Undo/Redo (Ctrl+Z, Ctrl+Shift+Z, Ctrl+Y)
        Key::Character(ref s) if (ctrl || logo) && s.eq_ignore_ascii_case("z") => {
            if shift {
                update(model, Msg::Document(DocumentMsg::Redo))
            } else {
                update(model, Msg::Document(DocumentMsg::Undo))
            }
        }
        Key::Character(ref s) if (ctrl || logo) && s.eq_ignore_ascii_case("y") => {
            update(model, Msg::Document(DocumentMsg::Redo))
        }

        // File operations
        Key::Character(ref s) if s.eq_ignore_ascii_case("n") && (ctrl || logo) => {
            update(model, Msg::App(AppMsg::NewFile))
        }
        Key::Character(ref s) if s.eq_ignore_ascii_case("o") && (ctrl || logo) => {
            update(model, Msg::App(AppMsg::OpenFileDialog))
        }
        Key::Character(ref s) if s.eq_ignore_ascii_case("s") && (ctrl || logo) && shift => {
            update(model, Msg::App(AppMsg::SaveFileAs))
        }
        Key::Character(ref s) if s.eq_ignore_ascii_case("s") && (ctrl || logo) => {
            update(model, Msg::App(AppMsg::SaveFile))
        }
        Key::Character(ref s) if s.eq_ignore_ascii_case("p") && (ctrl || logo) => {
            update(model, Msg::App(AppMsg::ExportPdf))
        }
        Key::Character(ref s) if s.eq_ignore_ascii_case("q") && (ctrl || logo) => {
            update(model, Msg::App(AppMsg::Quit))
        }

        // CPF/CNPJ mode (Ctrl+J)
        Key::Character(ref s) if s.eq_ignore_ascii_case("j") && (ctrl || logo) => {
            update(model, Msg::App(AppMsg::ToggleTaxIdMode))
        }

        // Clipboard
        Key::Character(ref s) if s.eq_ignore_ascii_case("a") && (ctrl || logo) => {
            update(model, Msg::Editor(EditorMsg::SelectAll))
        }
        Key::Character(ref s) if s.eq_ignore_ascii_case("c") && (ctrl || logo) => {
            update(model, Msg::Document(DocumentMsg::Copy))
        }
        Key::Character(ref s) if s.eq_ignore_ascii_case("x") && (ctrl || logo) => {
            update(model, Msg::Document(DocumentMsg::Cut))
        }
        Key::Character(ref s) if s.eq_ignore_ascii_case("v") && (ctrl || logo) => {
            update(model, Msg::Document(DocumentMsg::Paste))
        }

        // Font size (Ctrl+= / Ctrl+-)
        Key::Character(ref s) if (s == "=" || s == "+") && (ctrl || logo) => {
            update(model, Msg::App(AppMsg::IncreaseFontSize))
        }
        Key::Character(ref s) if s == "-" && (ctrl || logo) => {
            update(model, Msg::App(AppMsg::DecreaseFontSize))
        }

        // Shift+Enter appends the declaration block; Enter inserts a newline
        Key::Named(NamedKey::Enter) if shift => {
            update(model, Msg::Document(DocumentMsg::InsertTemplate))
        }
        Key::Named(NamedKey::Enter) => update(model, Msg::Document(DocumentMsg::InsertNewline)),

        Key::Named(NamedKey::Backspace) if ctrl => {
            update(model, Msg::Document(DocumentMsg::DeleteWordBackward))
        }
        Key::Named(NamedKey::Backspace) => {
            update(model, Msg::Document(DocumentMsg::DeleteBackward))
        }
        Key::Named(NamedKey::Delete) if ctrl => {
            update(model, Msg::Document(DocumentMsg::DeleteWordForward))
        }
        Key::Named(NamedKey::Delete) => update(model, Msg::Document(DocumentMsg::DeleteForward)),

        // Word movement (Ctrl+Arrow)
        Key::Named(NamedKey::ArrowLeft) if ctrl && shift => update(
            model,
            Msg::Editor(EditorMsg::MoveCursorWordWithSelection(Direction::Left)),
        ),
        Key::Named(NamedKey::ArrowRight) if ctrl && shift => update(
            model,
            Msg::Editor(EditorMsg::MoveCursorWordWithSelection(Direction::Right)),
        ),
        Key::Named(NamedKey::ArrowLeft) if ctrl => {
            update(model, Msg::Editor(EditorMsg::MoveCursorWord(Direction::Left)))
        }
        Key::Named(NamedKey::ArrowRight) if ctrl => update(
            model,
            Msg::Editor(EditorMsg::MoveCursorWord(Direction::Right)),
        ),

        // Plain and selecting arrow movement
        Key::Named(NamedKey::ArrowLeft) if shift => update(
            model,
            Msg::Editor(EditorMsg::MoveCursorWithSelection(Direction::Left)),
        ),
        Key::Named(NamedKey::ArrowRight) if shift => update(
            model,
            Msg::Editor(EditorMsg::MoveCursorWithSelection(Direction::Right)),
        ),
        Key::Named(NamedKey::ArrowUp) if shift => update(
            model,
            Msg::Editor(EditorMsg::MoveCursorWithSelection(Direction::Up)),
        ),
        Key::Named(NamedKey::ArrowDown) if shift => update(
            model,
            Msg::Editor(EditorMsg::MoveCursorWithSelection(Direction::Down)),
        ),
        Key::Named(NamedKey::ArrowLeft) => update(model, Msg::move_cursor(Direction::Left)),
        Key::Named(NamedKey::ArrowRight) => update(model, Msg::move_cursor(Direction::Right)),
        Key::Named(NamedKey::ArrowUp) => update(model, Msg::move_cursor(Direction::Up)),
        Key::Named(NamedKey::ArrowDown) => update(model, Msg::move_cursor(Direction::Down)),

        // Home/End, document navigation
        Key::Named(NamedKey::Home) if ctrl => {
            update(model, Msg::Editor(EditorMsg::MoveCursorDocumentStart))
        }
        Key::Named(NamedKey::End) if ctrl => {
            update(model, Msg::Editor(EditorMsg::MoveCursorDocumentEnd))
        }
        Key::Named(NamedKey::Home) if shift => update(
            model,
            Msg::Editor(EditorMsg::MoveCursorLineStartWithSelection),
        ),
        Key::Named(NamedKey::End) if shift => update(
            model,
            Msg::Editor(EditorMsg::MoveCursorLineEndWithSelection),
        ),
        Key::Named(NamedKey::Home) => update(model, Msg::Editor(EditorMsg::MoveCursorLineStart)),
        Key::Named(NamedKey::End) => update(model, Msg::Editor(EditorMsg::MoveCursorLineEnd)),

        Key::Named(NamedKey::PageUp) => update(model, Msg::Editor(EditorMsg::PageUp)),
        Key::Named(NamedKey::PageDown) => update(model, Msg::Editor(EditorMsg::PageDown)),

        // Escape clears the selection
        Key::Named(NamedKey::Escape) => {
            if model.editor.has_selection() {
                update(model, Msg::Editor(EditorMsg::ClearSelection))
            } else {
                None
            }
        }

        Key::Named(NamedKey::Tab) => update(model, Msg::insert_char('\t')),
        Key::Named(NamedKey::Space) => update(model, Msg::insert_char(' ')),

        // Plain character input
        Key::Character(ref s) if !ctrl && !logo => {
            let mut cmd = None;
            for ch in s.chars() {
                cmd = update(model, Msg::insert_char(ch));
            }
            cmd
        }

        _ => None,
    }
}

// ============================================================================
// APPLICATION
// ============================================================================

struct App {
    model: AppModel,
    renderer: Option<Renderer>,
    window: Option<Rc<Window>>,
    context: Option<Context<Rc<Window>>>,
    last_tick: Instant,
    modifiers: ModifiersState,
    mouse_position: Option<(f64, f64)>,
    /// Font bytes shared between the renderer and PDF export
    font_data: Vec<u8>,
    /// File passed on the command line, loaded once the window exists
    startup_file: Option<PathBuf>,
    /// Track left mouse button state for drag selection
    left_mouse_down: bool,
    /// Mouse position when left button was pressed (for drag threshold)
    drag_start_position: Option<(f64, f64)>,
    /// True once drag distance threshold exceeded
    drag_active: bool,
    /// Channel for results posted by worker threads
    msg_tx: Sender<Msg>,
    msg_rx: Receiver<Msg>,
    should_quit: bool,
}

impl App {
    fn new(window_width: u32, window_height: u32, startup_file: Option<PathBuf>) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            model: AppModel::new(window_width, window_height),
            renderer: None,
            window: None,
            context: None,
            last_tick: Instant::now(),
            modifiers: ModifiersState::empty(),
            mouse_position: None,
            font_data: Vec::new(),
            startup_file,
            left_mouse_down: false,
            drag_start_position: None,
            drag_active: false,
            msg_tx,
            msg_rx,
            should_quit: false,
        }
    }

    fn init_renderer(&mut self, window: Rc<Window>, context: &Context<Rc<Window>>) -> Result<()> {
        self.font_data = load_system_font()?;
        let renderer = Renderer::new(window, context, &self.font_data, self.model.font_size)?;

        // Sync actual metrics to the model for viewport calculations
        self.model
            .set_font_metrics(renderer.char_width(), renderer.line_height());

        self.renderer = Some(renderer);
        Ok(())
    }

    fn handle_event(&mut self, event: &WindowEvent) -> Option<Cmd> {
        match event {
            WindowEvent::Resized(size) => update(
                &mut self.model,
                Msg::App(AppMsg::Resize(size.width, size.height)),
            ),
            WindowEvent::ModifiersChanged(mods) => {
                self.modifiers = mods.state();
                None
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    let ctrl = self.modifiers.control_key();
                    let shift = self.modifiers.shift_key();
                    let logo = self.modifiers.super_key();
                    handle_key(
                        &mut self.model,
                        event.logical_key.clone(),
                        ctrl,
                        shift,
                        logo,
                    )
                } else {
                    None
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    tracing::error!("Render error: {}", e);
                }
                None
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -(*y * 3.0) as i32,
                    MouseScrollDelta::PixelDelta(pos) => {
                        -(pos.y / self.model.line_height.max(1) as f64) as i32
                    }
                };
                if lines != 0 {
                    update(&mut self.model, Msg::Editor(EditorMsg::Scroll(lines)))
                } else {
                    None
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.handle_cursor_moved(*position),
            WindowEvent::MouseInput { state, button, .. } => {
                if *button != MouseButton::Left {
                    return None;
                }
                match state {
                    ElementState::Pressed => self.handle_left_click(),
                    ElementState::Released => {
                        self.left_mouse_down = false;
                        self.drag_start_position = None;
                        self.drag_active = false;
                        None
                    }
                }
            }
            _ => None,
        }
    }

    fn handle_cursor_moved(&mut self, position: winit::dpi::PhysicalPosition<f64>) -> Option<Cmd> {
        self.mouse_position = Some((position.x, position.y));

        // Hover tracking for the open dropdown
        if let Some(menu_index) = self.model.ui.open_menu {
            if let Some(renderer) = &self.renderer {
                let hit = dropdown_hit(menu_index, position.x, position.y, renderer.char_width());
                if hit != self.model.ui.menu_hover {
                    return update(&mut self.model, Msg::Ui(UiMsg::HoverMenuItem(hit)));
                }
            }
            return None;
        }

        if !self.left_mouse_down || self.model.ui.modal_active() {
            return None;
        }

        const DRAG_THRESHOLD_PIXELS: f64 = 4.0;

        if !self.drag_active {
            let (start_x, start_y) = self.drag_start_position?;
            let dx = position.x - start_x;
            let dy = position.y - start_y;
            if (dx * dx + dy * dy).sqrt() < DRAG_THRESHOLD_PIXELS {
                return None;
            }
            self.drag_active = true;
        }

        let (line, column) = self
            .renderer
            .as_ref()?
            .pixel_to_cursor(position.x, position.y, &self.model);
        update(
            &mut self.model,
            Msg::Editor(EditorMsg::ExtendSelectionToPosition { line, column }),
        )
    }

    fn handle_left_click(&mut self) -> Option<Cmd> {
        let (x, y) = self.mouse_position?;
        let char_width = self.renderer.as_ref()?.char_width();

        // Modal buttons swallow every click while a modal is open
        if let Some(modal) = self.model.ui.modal.clone() {
            if let Some((index, msg)) = modal_click_hit(&modal, self.model.window_size, x, y) {
                // Clicking an unsaved-changes button selects it before confirming
                if let Modal::UnsavedChanges { .. } = modal {
                    self.model.ui.modal = Some(Modal::UnsavedChanges {
                        selected: UnsavedChoice::ALL[index],
                    });
                }
                return update(&mut self.model, Msg::Ui(UiMsg::Modal(msg)));
            }
            return None;
        }

        // Menu bar
        if let Some(index) = menu_bar_hit(x, y, char_width) {
            return if self.model.ui.open_menu == Some(index) {
                update(&mut self.model, Msg::Ui(UiMsg::CloseMenu))
            } else {
                update(&mut self.model, Msg::Ui(UiMsg::OpenMenu(index)))
            };
        }

        // Open dropdown: item click dispatches its action, anything else closes
        if let Some(menu_index) = self.model.ui.open_menu {
            if let Some(entry_index) = dropdown_hit(menu_index, x, y, char_width) {
                let close = update(&mut self.model, Msg::Ui(UiMsg::CloseMenu));
                if let MenuEntry::Item { action, .. } = MENUS[menu_index].entries[entry_index] {
                    let action_cmd = update(&mut self.model, action.to_msg());
                    return Some(Cmd::batch(
                        [close, action_cmd].into_iter().flatten().collect(),
                    ));
                }
                return close;
            }
            return update(&mut self.model, Msg::Ui(UiMsg::CloseMenu));
        }

        // Toolbar
        if let Some(action) = toolbar_hit(x, y, char_width) {
            return update(&mut self.model, action.to_msg());
        }

        // Text area click places the cursor (Shift extends the selection)
        if y >= self.model.text_area_top() as f64 {
            let renderer = self.renderer.as_ref()?;
            let (line, column) = renderer.pixel_to_cursor(x, y, &self.model);
            self.left_mouse_down = true;
            self.drag_start_position = Some((x, y));
            self.drag_active = false;

            let msg = if self.modifiers.shift_key() {
                Msg::Editor(EditorMsg::ExtendSelectionToPosition { line, column })
            } else {
                Msg::Editor(EditorMsg::SetCursorPosition { line, column })
            };
            return update(&mut self.model, msg);
        }

        None
    }

    fn render(&mut self) -> Result<()> {
        if let Some(renderer) = &mut self.renderer {
            renderer.render(&mut self.model)?;
        }
        Ok(())
    }

    fn tick(&mut self) -> Option<Cmd> {
        update(&mut self.model, Msg::Ui(UiMsg::Tick))
    }

    /// Process a command, potentially spawning async operations
    fn process_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None => {}
            Cmd::Redraw => {
                // Handled by the caller requesting a window redraw
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd);
                }
            }
            Cmd::SaveFile { path, content } => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let result = std::fs::write(&path, content).map_err(|e| e.to_string());
                    let _ = tx.send(Msg::App(AppMsg::SaveCompleted { path, result }));
                });
            }
            Cmd::LoadFile { path } => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let result = std::fs::read_to_string(&path).map_err(|e| e.to_string());
                    let _ = tx.send(Msg::App(AppMsg::FileLoaded { path, result }));
                });
            }
            Cmd::ShowOpenFileDialog => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let path = rfd::FileDialog::new()
                        .add_filter("Arquivos de Texto", &["txt"])
                        .add_filter("Todos os Arquivos", &["*"])
                        .pick_file();
                    let _ = tx.send(Msg::App(AppMsg::OpenFileDialogResult { path }));
                });
            }
            Cmd::ShowSaveFileDialog { suggested_path } => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let mut dialog = rfd::FileDialog::new()
                        .add_filter("Arquivos de Texto", &["txt"])
                        .add_filter("Todos os Arquivos", &["*"]);
                    if let Some(suggested) = &suggested_path {
                        if let Some(dir) = suggested.parent() {
                            dialog = dialog.set_directory(dir);
                        }
                        if let Some(name) = suggested.file_name() {
                            dialog = dialog.set_file_name(name.to_string_lossy());
                        }
                    }
                    let path = dialog.save_file().map(|p| {
                        if p.extension().is_none() {
                            p.with_extension("txt")
                        } else {
                            p
                        }
                    });
                    let _ = tx.send(Msg::App(AppMsg::SaveFileAsDialogResult { path }));
                });
            }
            Cmd::ShowExportPdfDialog { suggested_name } => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    let path = rfd::FileDialog::new()
                        .add_filter("PDF Files", &["pdf"])
                        .set_file_name(&suggested_name)
                        .save_file()
                        .map(|p| {
                            if p.extension().is_none() {
                                p.with_extension("pdf")
                            } else {
                                p
                            }
                        });
                    let _ = tx.send(Msg::App(AppMsg::ExportPdfDialogResult { path }));
                });
            }
            Cmd::ExportPdf {
                path,
                content,
                font_size,
            } => {
                let tx = self.msg_tx.clone();
                let font_data = self.font_data.clone();
                std::thread::spawn(move || {
                    let result = pdf::export(&path, &content, font_size, &font_data)
                        .map_err(|e| e.to_string());
                    let _ = tx.send(Msg::App(AppMsg::PdfExported { path, result }));
                });
            }
            Cmd::OpenPath { path } => {
                let tx = self.msg_tx.clone();
                std::thread::spawn(move || {
                    if let Err(e) = open::that(&path) {
                        let _ = tx.send(Msg::Ui(UiMsg::ShowError {
                            title: "Aviso".to_string(),
                            message: format!("Não foi possível abrir o PDF:\n{}", e),
                        }));
                    }
                });
            }
            Cmd::SetWindowTitle(title) => {
                if let Some(window) = &self.window {
                    window.set_title(&title);
                }
            }
            Cmd::Quit => {
                self.should_quit = true;
            }
        }
    }

    /// Process pending async messages from the channel
    fn process_async_messages(&mut self) -> bool {
        let mut needs_redraw = false;
        let messages: Vec<Msg> = std::iter::from_fn(|| self.msg_rx.try_recv().ok()).collect();
        for msg in messages {
            if let Some(cmd) = update(&mut self.model, msg) {
                if cmd.needs_redraw() {
                    needs_redraw = true;
                }
                self.process_cmd(cmd);
            }
        }
        needs_redraw
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title(BASE_TITLE)
                .with_inner_size(LogicalSize::new(1024, 768))
                .with_maximized(true);

            let window = match event_loop.create_window(window_attributes) {
                Ok(w) => Rc::new(w),
                Err(e) => {
                    tracing::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };
            let context = match Context::new(Rc::clone(&window)) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!("Failed to create graphics context: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            if let Err(e) = self.init_renderer(Rc::clone(&window), &context) {
                tracing::error!("Failed to initialize renderer: {}", e);
                event_loop.exit();
                return;
            }

            let size = window.inner_size();
            if let Some(cmd) = update(
                &mut self.model,
                Msg::App(AppMsg::Resize(size.width, size.height)),
            ) {
                self.process_cmd(cmd);
            }

            if let Some(path) = self.startup_file.take() {
                self.process_cmd(Cmd::LoadFile { path });
            }

            self.window = Some(window);
            self.context = Some(context);
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window_id != window.id() {
            return;
        }

        // Close button goes through the unsaved-changes gate like Ctrl+Q
        let cmd = if matches!(event, WindowEvent::CloseRequested) {
            update(&mut self.model, Msg::App(AppMsg::Quit))
        } else {
            self.handle_event(&event)
        };

        if let Some(cmd) = cmd {
            let needs_redraw = cmd.needs_redraw();
            self.process_cmd(cmd);
            if needs_redraw {
                window.request_redraw();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);

        if self.should_quit {
            event_loop.exit();
            return;
        }

        if self.process_async_messages() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        // Cursor blink and transient message expiry
        let now = Instant::now();
        if now.duration_since(self.last_tick) > Duration::from_millis(500) {
            self.last_tick = now;
            if self.tick().is_some() {
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
        }
    }
}

// ============================================================================
// MAIN - Entry point
// ============================================================================

fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse_args();

    let event_loop = EventLoop::new()?;
    let mut app = App::new(1024, 768, cli.file);

    event_loop.run_app(&mut app)?;

    Ok(())
}

// ============================================================================
// TESTS - Keyboard handling tests that require handle_key()
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anuencia::model::{Document, Session};
    use anuencia::template;

    fn test_model() -> AppModel {
        let mut model = AppModel::new(800, 600);
        model.document = Document::with_text(&template::initial_text());
        model.session = Session::new("Toledo".to_string());
        model
    }

    fn press_char(model: &mut AppModel, ch: &str, ctrl: bool, shift: bool) -> Option<Cmd> {
        handle_key(model, Key::Character(ch.into()), ctrl, shift, false)
    }

    #[test]
    fn ctrl_z_triggers_undo_not_insert_z() {
        let mut model = test_model();
        let before = model.document.text();

        press_char(&mut model, "a", false, false);
        assert_ne!(model.document.text(), before);

        press_char(&mut model, "z", true, false);
        assert_eq!(model.document.text(), before);
        assert!(!model.document.text().contains('z'));
    }

    #[test]
    fn shift_enter_appends_declaration_block() {
        let mut model = test_model();
        let before_len = model.document.buffer.len_chars();

        handle_key(
            &mut model,
            Key::Named(NamedKey::Enter),
            false,
            true,
            false,
        );

        let text = model.document.text();
        assert!(model.document.buffer.len_chars() > before_len);
        assert!(text.ends_with(template::DISCLAIMER_LINE));
        // Cursor lands at the end of the buffer
        let (line, column) = model.document.end_position();
        assert_eq!(model.editor.cursor.line, line);
        assert_eq!(model.editor.cursor.column, column);
    }

    #[test]
    fn ctrl_j_toggles_tax_id_mode() {
        let mut model = test_model();
        assert_eq!(model.session.tax_id_mode, template::TaxIdMode::Cpf);

        press_char(&mut model, "j", true, false);
        assert_eq!(model.session.tax_id_mode, template::TaxIdMode::Cnpj);

        press_char(&mut model, "j", true, false);
        assert_eq!(model.session.tax_id_mode, template::TaxIdMode::Cpf);
    }

    #[test]
    fn typing_goes_to_modal_while_open() {
        let mut model = test_model();
        update(&mut model, Msg::Ui(UiMsg::PromptDefaultCity));
        assert!(model.ui.modal_active());
        let buffer_before = model.document.text();

        press_char(&mut model, "X", false, false);

        assert_eq!(model.document.text(), buffer_before);
        match &model.ui.modal {
            Some(Modal::CityPrompt(input)) => assert!(input.input.ends_with('X')),
            other => panic!("unexpected modal state: {:?}", other),
        }
    }

    #[test]
    fn escape_dismisses_modal() {
        let mut model = test_model();
        update(&mut model, Msg::Ui(UiMsg::ShowAbout));
        assert!(model.ui.modal_active());

        handle_key(
            &mut model,
            Key::Named(NamedKey::Escape),
            false,
            false,
            false,
        );
        assert!(!model.ui.modal_active());
    }

    #[test]
    fn ctrl_q_with_clean_buffer_quits_directly() {
        let mut model = test_model();
        let cmd = press_char(&mut model, "q", true, false);
        assert!(matches!(cmd, Some(Cmd::Quit)));
        assert!(!model.ui.modal_active());
    }

    #[test]
    fn clicking_cancelar_in_unsaved_prompt_resolves_cancel() {
        let mut model = test_model();
        press_char(&mut model, "a", false, false);
        press_char(&mut model, "q", true, false);
        let modal = model.ui.modal.clone().expect("unsaved-changes prompt");

        // Each button center maps back to its own index
        let rects = modal_button_rects(&modal, model.window_size);
        for (i, (bx, by, bw, bh, _)) in rects.iter().enumerate() {
            let cx = *bx as f64 + *bw as f64 / 2.0;
            let cy = *by as f64 + *bh as f64 / 2.0;
            let (hit, _) = modal_click_hit(&modal, model.window_size, cx, cy).expect("button hit");
            assert_eq!(hit, i);
        }

        // Click the center of the third button (Cancelar)
        let (bx, by, bw, bh, _) = &rects[2];
        let x = *bx as f64 + *bw as f64 / 2.0;
        let y = *by as f64 + *bh as f64 / 2.0;
        let (index, msg) = modal_click_hit(&modal, model.window_size, x, y).expect("button hit");
        assert_eq!(UnsavedChoice::ALL[index], UnsavedChoice::Cancel);

        model.ui.modal = Some(Modal::UnsavedChanges {
            selected: UnsavedChoice::ALL[index],
        });
        let cmd = update(&mut model, Msg::Ui(UiMsg::Modal(msg)));

        assert!(!matches!(
            cmd,
            Some(Cmd::SaveFile { .. }) | Some(Cmd::ShowSaveFileDialog { .. })
        ));
        assert_eq!(model.session.pending, None);
        assert!(model.document.is_modified);
        assert!(!model.ui.modal_active());
    }

    #[test]
    fn show_error_keeps_the_given_title() {
        let mut model = test_model();
        update(
            &mut model,
            Msg::Ui(UiMsg::ShowError {
                title: "Aviso".to_string(),
                message: "Não foi possível abrir o PDF:\nsem visualizador".to_string(),
            }),
        );
        match &model.ui.modal {
            Some(Modal::Error { title, .. }) => assert_eq!(title, "Aviso"),
            other => panic!("expected error modal, got {:?}", other),
        }
    }

    #[test]
    fn ctrl_q_with_dirty_buffer_opens_prompt() {
        let mut model = test_model();
        press_char(&mut model, "a", false, false);
        assert!(model.document.is_modified);

        let cmd = press_char(&mut model, "q", true, false);
        assert!(!matches!(cmd, Some(Cmd::Quit)));
        assert!(matches!(
            model.ui.modal,
            Some(Modal::UnsavedChanges { .. })
        ));
    }
}
