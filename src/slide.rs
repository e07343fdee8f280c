//! Slide challenge: drag a tile into the notch it was cut from.
//!
//! The master image is a background crop with one shadow notch per
//! candidate block; the tile is the background under the answer block,
//! clipped by the graph's mask and covered by its overlay.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::basics::{clamp_low_wins, Point, RangeVal, Size};
use crate::canvas::Canvas;
use crate::color::format_alpha;
use crate::error::{ConfigError, ResourceError, Result};
use crate::image_data::{JpegImageData, PngImageData};
use crate::layout::Block;
use crate::options::{check_alpha, check_angles, check_range, check_size};
use crate::random::{pick, rand_angle, rand_cut_pos, rand_int, rand_range};
use crate::rgba_canvas::RgbaCanvas;

/// Distance kept between blocks or display points and the canvas edge.
const EDGE: i32 = 5;

/// Room reserved right of the block lanes.
const LANE_RESERVE: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlideMode {
    /// Horizontal drag; the tile starts on the left at the block's height.
    #[default]
    Basic,
    /// Free drag; the tile starts at the dead-zone edge.
    Region,
}

/// Edge the answer is biased towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadZoneDirection {
    Left,
    Right,
    Top,
    Bottom,
}

// ============================================================================
// Options
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideOptions {
    image_size: Size,
    image_alpha: f32,
    range_dead_zone_directions: Vec<DeadZoneDirection>,
    range_graph_size: RangeVal,
    range_graph_angles: Vec<RangeVal>,
    gen_graph_number: i32,
    enable_graph_vertical_random: bool,
}

impl Default for SlideOptions {
    fn default() -> Self {
        Self {
            image_size: Size::new(300, 240),
            image_alpha: 1.0,
            range_dead_zone_directions: vec![
                DeadZoneDirection::Left,
                DeadZoneDirection::Right,
                DeadZoneDirection::Bottom,
                DeadZoneDirection::Top,
            ],
            range_graph_size: RangeVal::new(62, 72),
            range_graph_angles: vec![RangeVal::new(0, 0)],
            gen_graph_number: 1,
            enable_graph_vertical_random: false,
        }
    }
}

impl SlideOptions {
    pub fn from_json(s: &str) -> std::result::Result<Self, ConfigError> {
        let opts: Self = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        check_size("image_size", self.image_size)?;
        check_alpha(self.image_alpha)?;
        check_range("range_graph_size", self.range_graph_size)?;
        check_angles("range_graph_angles", &self.range_graph_angles)?;
        if self.range_dead_zone_directions.is_empty() {
            return Err(ConfigError::Empty("range_dead_zone_directions"));
        }
        if self.gen_graph_number < 1 {
            return Err(ConfigError::InvalidRange {
                name: "gen_graph_number",
                min: self.gen_graph_number,
                max: self.gen_graph_number,
            });
        }
        let size = self.range_graph_size.max;
        let lanes = self.image_size.width - size - LANE_RESERVE;
        if size < 1 || lanes < self.gen_graph_number || self.image_size.height - size - 2 * EDGE < 0 {
            return Err(ConfigError::TokenTooLarge {
                size,
                width: self.image_size.width,
                height: self.image_size.height,
            });
        }
        Ok(())
    }

    pub fn with_image_size(mut self, size: Size) -> std::result::Result<Self, ConfigError> {
        self.image_size = check_size("image_size", size)?;
        Ok(self)
    }

    /// Opacity of the shadow notches.
    pub fn with_image_alpha(mut self, alpha: f32) -> std::result::Result<Self, ConfigError> {
        self.image_alpha = check_alpha(alpha)?;
        Ok(self)
    }

    pub fn with_range_dead_zone_directions(
        mut self,
        dirs: Vec<DeadZoneDirection>,
    ) -> std::result::Result<Self, ConfigError> {
        if dirs.is_empty() {
            return Err(ConfigError::Empty("range_dead_zone_directions"));
        }
        self.range_dead_zone_directions = dirs;
        Ok(self)
    }

    /// Side length of the square block.
    pub fn with_range_graph_size(mut self, r: RangeVal) -> std::result::Result<Self, ConfigError> {
        self.range_graph_size = check_range("range_graph_size", r)?;
        Ok(self)
    }

    pub fn with_range_graph_angles(mut self, bands: Vec<RangeVal>) -> std::result::Result<Self, ConfigError> {
        check_angles("range_graph_angles", &bands)?;
        self.range_graph_angles = bands;
        Ok(self)
    }

    /// Number of notches on the master, one of them the answer.
    pub fn with_gen_graph_number(mut self, n: i32) -> std::result::Result<Self, ConfigError> {
        if n < 1 {
            return Err(ConfigError::InvalidRange {
                name: "gen_graph_number",
                min: n,
                max: n,
            });
        }
        self.gen_graph_number = n;
        Ok(self)
    }

    /// Sample a fresh height for every block instead of sharing one.
    pub fn with_enable_graph_vertical_random(mut self, on: bool) -> Self {
        self.enable_graph_vertical_random = on;
        self
    }

    pub fn image_size(&self) -> Size {
        self.image_size
    }

    pub fn image_alpha(&self) -> f32 {
        self.image_alpha
    }

    pub fn range_dead_zone_directions(&self) -> &[DeadZoneDirection] {
        &self.range_dead_zone_directions
    }

    pub fn range_graph_size(&self) -> RangeVal {
        self.range_graph_size
    }

    pub fn range_graph_angles(&self) -> &[RangeVal] {
        &self.range_graph_angles
    }

    pub fn gen_graph_number(&self) -> i32 {
        self.gen_graph_number
    }

    pub fn enable_graph_vertical_random(&self) -> bool {
        self.enable_graph_vertical_random
    }
}

// ============================================================================
// Resources
// ============================================================================

/// The three layers of one puzzle piece. They are scaled to the block size
/// when drawn, so any resolution works.
#[derive(Debug, Clone)]
pub struct GraphImage {
    /// Drawn over the tile.
    pub overlay: RgbaCanvas,
    /// Stamped on the master at every block.
    pub shadow: RgbaCanvas,
    /// Alpha template that cuts the tile out of the background.
    pub mask: RgbaCanvas,
}

impl GraphImage {
    fn check(&self) -> std::result::Result<(), ResourceError> {
        for (name, layer) in [("overlay", &self.overlay), ("shadow", &self.shadow), ("mask", &self.mask)] {
            if !layer.size().is_valid() {
                return Err(ResourceError::EmptyGraphLayer(name));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SlideResources {
    backgrounds: Vec<RgbaCanvas>,
    graph_images: Vec<GraphImage>,
}

impl SlideResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backgrounds(mut self, backgrounds: Vec<RgbaCanvas>) -> Self {
        self.backgrounds = backgrounds;
        self
    }

    pub fn with_graph_images(mut self, graphs: Vec<GraphImage>) -> Self {
        self.graph_images = graphs;
        self
    }

    pub fn backgrounds(&self) -> &[RgbaCanvas] {
        &self.backgrounds
    }

    pub fn graph_images(&self) -> &[GraphImage] {
        &self.graph_images
    }
}

// ============================================================================
// Output
// ============================================================================

#[derive(Debug, Clone)]
pub struct SlideCaptchaData {
    block: Block,
    master: JpegImageData,
    tile: PngImageData,
}

impl SlideCaptchaData {
    /// Answer record: block position on the master and tile start point.
    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn master_image(&self) -> &JpegImageData {
        &self.master
    }

    pub fn tile_image(&self) -> &PngImageData {
        &self.tile
    }

    pub fn into_parts(self) -> (Block, JpegImageData, PngImageData) {
        (self.block, self.master, self.tile)
    }
}

// ============================================================================
// Generator
// ============================================================================

#[derive(Debug, Clone)]
pub struct Slide {
    mode: SlideMode,
    opts: SlideOptions,
    res: SlideResources,
}

impl Slide {
    /// Build a generator. Basic mode always biases to the left edge and
    /// keeps one shared block height.
    pub fn new(mode: SlideMode, mut opts: SlideOptions, res: SlideResources) -> Result<Self> {
        if mode == SlideMode::Basic {
            opts.range_dead_zone_directions = vec![DeadZoneDirection::Left];
            opts.enable_graph_vertical_random = false;
        }
        opts.validate()?;
        Ok(Self { mode, opts, res })
    }

    pub fn mode(&self) -> SlideMode {
        self.mode
    }

    pub fn options(&self) -> &SlideOptions {
        &self.opts
    }

    pub fn generate(&self) -> Result<SlideCaptchaData> {
        self.generate_with_rng(&mut rand::rng())
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SlideCaptchaData> {
        self.check()?;
        log::debug!("slide {:?}: resources checked", self.mode);

        let graph = pick(rng, self.res.graph_images()).ok_or(ResourceError::NoGraphImage)?;
        let (blocks, display) = self.gen_blocks(rng);
        let mut block = *pick(rng, &blocks).ok_or(ResourceError::NoGraphImage)?;
        log::debug!("slide {:?}: {} blocks laid out", self.mode, blocks.len());

        let background = pick(rng, self.res.backgrounds()).ok_or(ResourceError::NoBackground)?;
        let size = self.opts.image_size();
        let mut plain = RgbaCanvas::new(size)?;
        plain.copy_from(background, rand_cut_pos(rng, size, background.size()));

        let alpha = format_alpha(self.opts.image_alpha());
        let mut master = plain.clone();
        for b in &blocks {
            let mut shadow = fit_layer(&graph.shadow, b)?;
            shadow.scale_alpha(alpha);
            master.draw_image(&shadow, Point::new(b.x, b.y));
        }
        log::debug!("slide {:?}: master rendered", self.mode);

        let tile = draw_tile(&plain, graph, &block)?;
        block.display_x = display.x;
        block.display_y = display.y;
        log::debug!("slide {:?}: tile rendered at {}x{}", self.mode, block.x, block.y);

        Ok(SlideCaptchaData {
            block,
            master: JpegImageData::new(master),
            tile: PngImageData::new(tile),
        })
    }

    fn check(&self) -> Result<()> {
        if self.res.graph_images().is_empty() {
            return Err(ResourceError::NoGraphImage.into());
        }
        for graph in self.res.graph_images() {
            graph.check()?;
        }
        if self.res.backgrounds().is_empty() {
            return Err(ResourceError::NoBackground.into());
        }
        Ok(())
    }

    /// Candidate blocks in equal lanes, plus the point the tile starts at.
    fn gen_blocks<R: Rng + ?Sized>(&self, rng: &mut R) -> (Vec<Block>, Point) {
        let opts = &self.opts;
        let Size { width, height } = opts.image_size();
        let n = opts.gen_graph_number().max(1);

        let angle = rand_angle(rng, opts.range_graph_angles());
        let side = rand_range(rng, opts.range_graph_size());
        let dir = pick(rng, opts.range_dead_zone_directions())
            .copied()
            .unwrap_or(DeadZoneDirection::Left);
        let half = side / 2;
        let lane = (width - side - LANE_RESERVE) / n;

        let mut y = rand_y(rng, height, side, dir);
        let mut blocks = Vec::with_capacity(n as usize);
        for i in 0..n {
            let (mut start, mut end) = (i * lane + half + EDGE, (i + 1) * lane - half);
            if dir == DeadZoneDirection::Left {
                start += side;
                end += side;
            }
            start = start.max(half + EDGE);
            let x = rand_int(rng, start + LANE_RESERVE, end + LANE_RESERVE) - half;
            if opts.enable_graph_vertical_random() {
                y = rand_y(rng, height, side, dir);
            }
            blocks.push(Block {
                x: clamp_low_wins(x, 0, width - side),
                y: clamp_low_wins(y, 0, height - side),
                width: side,
                height: side,
                angle,
                ..Block::default()
            });
        }

        let far = Point::new(width - side - EDGE, height - side - EDGE);
        let display = match (self.mode, dir) {
            (SlideMode::Basic, _) => Point::new(rand_int(rng, EDGE, half), y),
            (SlideMode::Region, DeadZoneDirection::Top) => Point::new(rand_int(rng, EDGE, far.x), EDGE),
            (SlideMode::Region, DeadZoneDirection::Bottom) => Point::new(rand_int(rng, EDGE, far.x), far.y),
            (SlideMode::Region, DeadZoneDirection::Left) => Point::new(EDGE, rand_int(rng, EDGE, far.y)),
            (SlideMode::Region, DeadZoneDirection::Right) => Point::new(far.x, rand_int(rng, EDGE, far.y)),
        };
        (blocks, display)
    }
}

/// Block height, kept off the edge the answer is biased towards.
fn rand_y<R: Rng + ?Sized>(rng: &mut R, height: i32, side: i32, dir: DeadZoneDirection) -> i32 {
    let (mut lo, mut hi) = (EDGE, height - side - EDGE);
    match dir {
        DeadZoneDirection::Top => lo += side,
        DeadZoneDirection::Bottom => hi -= side,
        _ => {}
    }
    rand_int(rng, lo, hi)
}

/// A graph layer scaled to the block and turned by its angle.
fn fit_layer(layer: &RgbaCanvas, block: &Block) -> Result<RgbaCanvas> {
    let mut out = layer.clone();
    out.scale(Size::new(block.width, block.height), false, false)?;
    out.rotate_with(block.angle, true);
    Ok(out)
}

/// Background under `block`, clipped by the mask, overlay on top.
fn draw_tile(plain: &RgbaCanvas, graph: &GraphImage, block: &Block) -> Result<RgbaCanvas> {
    let mut tile = RgbaCanvas::new(Size::new(block.width, block.height))?;
    tile.copy_from(plain, Point::new(block.x, block.y));
    tile.apply_mask(&fit_layer(&graph.mask, block)?);
    tile.draw_image(&fit_layer(&graph.overlay, block)?, Point::default());
    Ok(tile)
}

// ============================================================================
// Builder
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct SlideBuilder {
    opts: SlideOptions,
    res: SlideResources,
}

impl SlideBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_options(&mut self, opts: SlideOptions) -> &mut Self {
        self.opts = opts;
        self
    }

    pub fn set_resources(&mut self, res: SlideResources) -> &mut Self {
        self.res = res;
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    pub fn make(&self) -> Result<Slide> {
        Slide::new(SlideMode::Basic, self.opts.clone(), self.res.clone())
    }

    pub fn make_with_region(&self) -> Result<Slide> {
        Slide::new(SlideMode::Region, self.opts.clone(), self.res.clone())
    }
}
