use anyhow::Context as _;
use piano_scope::{self, args};

fn main() -> anyhow::Result<()> {
    use chargrid_sdl2::*;
    let args = args::parse();
    env_logger::init();
    let normal = std::fs::read(&args.font_path)
        .with_context(|| format!("failed to read font {}", args.font_path))?;
    let bold = match args.bold_font_path.as_ref() {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read font {}", path))?
        }
        None => normal.clone(),
    };
    let context = Context::new(Config {
        font_bytes: FontBytes { normal, bold },
        title: "Piano Synthesizer".to_string(),
        window_dimensions_px: Dimensions {
            width: 1272.,
            height: 720.,
        },
        cell_dimensions_px: Dimensions {
            width: 12.,
            height: 12.,
        },
        font_point_size: 12,
        character_cell_offset: Dimensions {
            width: 0.,
            height: -1.,
        },
        underline_width_cell_ratio: 0.1,
        underline_top_offset_cell_ratio: 0.8,
        resizable: false,
    });
    context.run(piano_scope::app::app(args)?);
    Ok(())
}
