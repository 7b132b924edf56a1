use crate::waveform::WaveShape;

const DEFAULT_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf";

pub struct Args {
    pub volume_scale: f64,
    pub initial_wave_shape: WaveShape,
    pub font_path: String,
    pub bold_font_path: Option<String>,
}

impl Args {
    fn parser() -> impl meap::Parser<Item = Self> {
        meap::let_map! {
            let {
                volume_scale = opt_opt::<f64, _>("FLOAT", "volume")
                    .name('v')
                    .with_default(1.0);
                initial_wave_shape = opt_opt_via::<WaveShape, _, _>("WAVE", "wave")
                    .name('w')
                    .with_default(WaveShape::Sine);
                font_path = opt_opt::<String, _>("PATH", "font")
                    .with_default(DEFAULT_FONT_PATH.to_string());
                bold_font_path = opt_opt::<String, _>("PATH", "bold-font");
            } in {
                Self {
                    volume_scale,
                    initial_wave_shape,
                    font_path,
                    bold_font_path,
                }
            }
        }
    }
}

pub fn parse() -> Args {
    use meap::Parser;
    Args::parser().with_help_default().parse_env_or_exit()
}
