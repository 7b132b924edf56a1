use crate::{
    args::Args,
    audio::CpalAudioSink,
    music::{self, PIANO_KEYS},
    playback::PlaybackTrigger,
    scope::Oscilloscope,
    waveform::WaveShape,
};
use chargrid::{control_flow::*, core::*, prelude::*};
use rgb_int::Rgb24;

const MARGIN_LEFT: i32 = 2;
const HINT_ROW: i32 = 1;
const KEY_ROW: i32 = 3;
const KEY_WIDTH: i32 = 7;
const KEY_HEIGHT: i32 = 3;
const KEY_GAP: i32 = 1;
const WAVE_ROW: i32 = 7;
const WAVE_LABEL: &str = "Wave Type: ";
const SCOPE_LABEL_ROW: i32 = 9;
const SCOPE_TOP: i32 = 10;
const SCOPE_LEFT: i32 = 10;
// rows below the scope hold the axis line and the time labels
const SCOPE_BOTTOM_PADDING: i32 = 3;

fn key_top_left(index: usize) -> Coord {
    Coord::new(MARGIN_LEFT + index as i32 * (KEY_WIDTH + KEY_GAP), KEY_ROW)
}

fn key_at(coord: Coord) -> Option<usize> {
    (0..PIANO_KEYS.len()).find(|&index| {
        let top_left = key_top_left(index);
        coord.x >= top_left.x
            && coord.x < top_left.x + KEY_WIDTH
            && coord.y >= top_left.y
            && coord.y < top_left.y + KEY_HEIGHT
    })
}

fn wave_option_text(shape: WaveShape) -> String {
    format!(" {} ", shape)
}

/// Each selectable wave shape with the column where its option starts
fn wave_options() -> impl Iterator<Item = (WaveShape, i32)> {
    let mut x = MARGIN_LEFT + WAVE_LABEL.len() as i32;
    WaveShape::ALL.into_iter().map(move |shape| {
        let start = x;
        x += wave_option_text(shape).len() as i32 + 1;
        (shape, start)
    })
}

fn wave_option_at(coord: Coord) -> Option<WaveShape> {
    if coord.y != WAVE_ROW {
        return None;
    }
    wave_options()
        .find(|&(shape, start)| {
            coord.x >= start && coord.x < start + wave_option_text(shape).len() as i32
        })
        .map(|(shape, _)| shape)
}

fn wave_shape_for_digit(ch: char) -> Option<WaveShape> {
    let index = ch.to_digit(10)? as usize;
    WaveShape::ALL.get(index.checked_sub(1)?).copied()
}

fn scope_size(grid_size: Size) -> Option<Size> {
    let width = grid_size.width() as i32 - SCOPE_LEFT - MARGIN_LEFT;
    let height = grid_size.height() as i32 - SCOPE_TOP - SCOPE_BOTTOM_PADDING;
    if width <= 0 || height <= 0 {
        return None;
    }
    Some(Size::new(width as u32, height as u32))
}

struct AppData {
    trigger: PlaybackTrigger<CpalAudioSink, Oscilloscope>,
    wave_shape: WaveShape,
    last_key: Option<usize>,
}

impl AppData {
    fn new(args: Args) -> anyhow::Result<Self> {
        let audio = CpalAudioSink::new(args.volume_scale)?;
        Ok(Self {
            trigger: PlaybackTrigger::new(audio, Oscilloscope::new()),
            wave_shape: args.initial_wave_shape,
            last_key: None,
        })
    }

    fn select_wave_shape(&mut self, shape: WaveShape) {
        if shape != self.wave_shape {
            log::info!("wave type: {}", shape);
            self.wave_shape = shape;
        }
    }

    // Blocks for the duration of the note. Events arriving meanwhile wait in the event loop.
    fn play_key(&mut self, index: usize) {
        let key = PIANO_KEYS[index];
        let shape = self.wave_shape;
        self.last_key = Some(index);
        log::info!("playing {} ({} Hz) as {}", key.label, key.frequency_hz, shape);
        if let Err(e) = self.trigger.play_key(key.frequency_hz, shape) {
            log::error!("failed to play {}: {}", key.label, e);
        }
    }
}

fn text_colour() -> Rgba32 {
    Rgba32::new_grey(223)
}

fn render_text(text: &str, coord: Coord, cell: RenderCell, ctx: Ctx, fb: &mut FrameBuffer) {
    for (i, ch) in text.chars().enumerate() {
        fb.set_cell_relative_to_ctx(
            ctx,
            coord + Coord::new(i as i32, 0),
            0,
            cell.with_character(ch),
        );
    }
}

fn plain_text(text: &str, coord: Coord, ctx: Ctx, fb: &mut FrameBuffer) {
    render_text(
        text,
        coord,
        RenderCell::default().with_foreground(text_colour()),
        ctx,
        fb,
    );
}

fn render_keys(state: &AppData, ctx: Ctx, fb: &mut FrameBuffer) {
    for (index, key) in PIANO_KEYS.iter().enumerate() {
        let background = if state.last_key == Some(index) {
            Rgb24::new(255, 223, 127).to_rgba32(255)
        } else {
            Rgba32::new_grey(239)
        };
        let cell = RenderCell::default()
            .with_character(' ')
            .with_foreground(Rgba32::new_grey(0))
            .with_background(background);
        let top_left = key_top_left(index);
        for y in 0..KEY_HEIGHT {
            for x in 0..KEY_WIDTH {
                fb.set_cell_relative_to_ctx(ctx, top_left + Coord::new(x, y), 0, cell);
            }
        }
        let centre_x = top_left.x + KEY_WIDTH / 2;
        render_text(
            &key.label.to_string(),
            Coord::new(centre_x, top_left.y + 1),
            cell,
            ctx,
            fb,
        );
        render_text(
            &key.binding.to_string(),
            Coord::new(centre_x, top_left.y + 2),
            cell.with_foreground(Rgba32::new_grey(127)),
            ctx,
            fb,
        );
    }
}

fn render_wave_selector(state: &AppData, ctx: Ctx, fb: &mut FrameBuffer) {
    plain_text(WAVE_LABEL, Coord::new(MARGIN_LEFT, WAVE_ROW), ctx, fb);
    for (shape, x) in wave_options() {
        let cell = if shape == state.wave_shape {
            RenderCell::default()
                .with_foreground(Rgba32::new_grey(0))
                .with_background(Rgb24::new(127, 191, 255).to_rgba32(255))
        } else {
            RenderCell::default().with_foreground(text_colour())
        };
        render_text(&wave_option_text(shape), Coord::new(x, WAVE_ROW), cell, ctx, fb);
    }
}

fn render_scope(scope: &Oscilloscope, ctx: Ctx, fb: &mut FrameBuffer) {
    let Some(size) = scope_size(ctx.bounding_box.size()) else {
        return;
    };
    let origin = Coord::new(SCOPE_LEFT, SCOPE_TOP);
    let axis_cell = RenderCell::default().with_foreground(Rgba32::new_grey(127));
    for y in 0..size.height() as i32 {
        fb.set_cell_relative_to_ctx(
            ctx,
            origin + Coord::new(-1, y),
            0,
            axis_cell.with_character('|'),
        );
    }
    for x in -1..size.width() as i32 {
        fb.set_cell_relative_to_ctx(
            ctx,
            origin + Coord::new(x, size.height() as i32),
            0,
            axis_cell.with_character('-'),
        );
    }
    let trace_cell = RenderCell::default()
        .with_character(' ')
        .with_background(Rgb24::new(63, 127, 255).to_rgba32(255));
    for coord in scope.trace_coords(size) {
        fb.set_cell_relative_to_ctx(ctx, origin + coord, 0, trace_cell);
    }
    let y_range = scope.y_range();
    let x_range = scope.x_range();
    plain_text("Amplitude", Coord::new(MARGIN_LEFT, SCOPE_LABEL_ROW), ctx, fb);
    plain_text(
        &format!("{:.0}", y_range.max),
        Coord::new(0, SCOPE_TOP),
        ctx,
        fb,
    );
    plain_text(
        &format!("{:.0}", y_range.min),
        Coord::new(0, SCOPE_TOP + size.height() as i32 - 1),
        ctx,
        fb,
    );
    let label_row = SCOPE_TOP + size.height() as i32 + 1;
    plain_text(
        &format!("{:.2}", x_range.min),
        Coord::new(SCOPE_LEFT, label_row),
        ctx,
        fb,
    );
    let max_label = format!("{:.2}", x_range.max);
    plain_text(
        &max_label,
        Coord::new(
            SCOPE_LEFT + size.width() as i32 - max_label.len() as i32,
            label_row,
        ),
        ctx,
        fb,
    );
    let time_label = "Time (s)";
    plain_text(
        time_label,
        Coord::new(
            SCOPE_LEFT + (size.width() as i32 - time_label.len() as i32) / 2,
            label_row,
        ),
        ctx,
        fb,
    );
}

struct GuiComponent;

impl Component for GuiComponent {
    type Output = ();
    type State = AppData;

    fn render(&self, state: &Self::State, ctx: Ctx, fb: &mut FrameBuffer) {
        let hint = PIANO_KEYS
            .iter()
            .map(|key| key.binding.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        plain_text(
            &format!("Keys: {}    Wave type: 1 2 3", hint),
            Coord::new(MARGIN_LEFT, HINT_ROW),
            ctx,
            fb,
        );
        render_keys(state, ctx, fb);
        render_wave_selector(state, ctx, fb);
        render_scope(state.trigger.display(), ctx, fb);
    }

    fn update(&mut self, state: &mut Self::State, _ctx: Ctx, event: Event) -> Self::Output {
        if let Some(mouse_input) = event.mouse_input() {
            match mouse_input {
                MouseInput::MousePress { coord, .. } => {
                    if let Some(index) = key_at(coord) {
                        state.play_key(index);
                    } else if let Some(shape) = wave_option_at(coord) {
                        state.select_wave_shape(shape);
                    }
                }
                _ => (),
            }
        }
        if let Some(keyboard_input) = event.keyboard_input() {
            match keyboard_input {
                KeyboardInput {
                    key: Key::Char(ch),
                    event: KeyboardEvent::KeyDown,
                } => {
                    if let Some(shape) = wave_shape_for_digit(ch) {
                        state.select_wave_shape(shape);
                    } else if let Some(index) = music::key_index_for_binding(ch) {
                        state.play_key(index);
                    }
                }
                _ => (),
            }
        }
    }

    fn size(&self, _state: &Self::State, ctx: Ctx) -> Size {
        ctx.bounding_box.size()
    }
}

pub fn app(args: Args) -> anyhow::Result<App> {
    let app_data = AppData::new(args)?;
    Ok(cf(GuiComponent)
        .with_state(app_data)
        .clear_each_frame()
        .ignore_output()
        .exit_on_close())
}
