//! Table geometry: surfaces per table type and the mapping between
//! surface-local and global board coordinates.
//!
//! Stored device positions are always global. Surface membership and local
//! coordinates are derived from the global position alone:
//!
//! ```text
//! Single               Back-to-back double        Free-standing double
//! +-----------+        +-----+-----+              +-----------+  y = 0
//! |     0     |        |  0  |  1  |              |     0     |
//! +-----------+        +-----+-----+              +-----------+  y = H
//!  W x H                W/2 each                   gap
//!                                                 +-----------+  y = H + gap
//!                                                 |     1     |
//!                                                 +-----------+
//! ```

use tablekit_core::{GeometryError, Point, Rect, Size};

use crate::config::GeometryConfig;
use crate::model::{Table, TableType};

/// One rectangular surface of a table, in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub index: usize,
    pub origin: Point,
    pub size: Size,
}

impl Surface {
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    pub fn to_local(&self, global: Point) -> Point {
        global - self.origin
    }

    pub fn to_global(&self, local: Point) -> Point {
        local + self.origin
    }

    /// Local y of the horizontal midline.
    pub fn midline(&self) -> f64 {
        self.size.height / 2.0
    }
}

/// Where a global position lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceLocation {
    pub surface: usize,
    pub local: Point,
}

/// Reference-image derived board dimensions.
///
/// `logical = image_pixels * image_scale + padding` on each axis, with the
/// scaled image centred on the board.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBoard {
    pub natural: Size,
    pub scale: f64,
    pub padding: f64,
}

impl ImageBoard {
    pub fn new(natural: Size, scale: f64, padding: f64) -> Result<Self, GeometryError> {
        if !natural.is_positive() {
            return Err(GeometryError::ImageNotMeasured);
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(GeometryError::InvalidDimension {
                name: "image_scale".to_string(),
                value: scale,
            });
        }
        Ok(Self {
            natural,
            scale,
            padding,
        })
    }

    /// The board of an image-board table, if an image has been measured.
    pub fn for_table(table: &Table, config: &GeometryConfig) -> Result<Self, GeometryError> {
        let natural = table
            .image_natural_size
            .ok_or(GeometryError::ImageNotMeasured)?;
        Self::new(natural, table.image_scale, config.image_padding)
    }

    /// Size of the scaled image in logical units.
    pub fn image_extent(&self) -> Size {
        self.natural.scaled(self.scale)
    }

    /// Logical board size.
    pub fn logical_size(&self) -> Size {
        let extent = self.image_extent();
        Size::new(extent.width + self.padding, extent.height + self.padding)
    }

    pub fn center(&self) -> Point {
        let size = self.logical_size();
        Point::new(size.width / 2.0, size.height / 2.0)
    }

    /// Logical rectangle occupied by the image.
    pub fn image_rect(&self) -> Rect {
        let extent = self.image_extent();
        let center = self.center();
        Rect::new(
            center.x - extent.width / 2.0,
            center.y - extent.height / 2.0,
            extent.width,
            extent.height,
        )
    }
}

/// Surfaces of one table, derived from its type and the board constants.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGeometry {
    table_type: TableType,
    surfaces: Vec<Surface>,
    /// Global y from which a point belongs to the lower free-standing surface.
    lower_surface_threshold: f64,
    half_width: f64,
}

impl TableGeometry {
    /// Builds the geometry of `table`.
    ///
    /// Image boards without a measured image fall back to a single
    /// `board_width x surface_height` surface so devices stay placeable
    /// before the first upload.
    pub fn for_table(table: &Table, config: &GeometryConfig) -> Result<Self, GeometryError> {
        let image = match table.table_type {
            TableType::ImageBoard => ImageBoard::for_table(table, config).ok(),
            _ => None,
        };
        Self::new(&table.table_type, config, image.as_ref())
    }

    pub fn new(
        table_type: &TableType,
        config: &GeometryConfig,
        image: Option<&ImageBoard>,
    ) -> Result<Self, GeometryError> {
        let w = config.board_width;
        let h = config.surface_height;
        let surfaces = match table_type {
            TableType::Single => vec![Surface {
                index: 0,
                origin: Point::zero(),
                size: Size::new(w, h),
            }],
            TableType::BackToBackDouble => vec![
                Surface {
                    index: 0,
                    origin: Point::zero(),
                    size: Size::new(w / 2.0, h),
                },
                Surface {
                    index: 1,
                    origin: Point::new(w / 2.0, 0.0),
                    size: Size::new(w / 2.0, h),
                },
            ],
            TableType::FreeStandingDouble => vec![
                Surface {
                    index: 0,
                    origin: Point::zero(),
                    size: Size::new(w, h),
                },
                Surface {
                    index: 1,
                    origin: Point::new(0.0, h + config.free_standing_gap),
                    size: Size::new(w, h),
                },
            ],
            TableType::ImageBoard => vec![Surface {
                index: 0,
                origin: Point::zero(),
                size: image.map(ImageBoard::logical_size).unwrap_or(Size::new(w, h)),
            }],
            TableType::Unsupported(raw) => {
                return Err(GeometryError::UnsupportedTableType {
                    table_type: raw.clone(),
                })
            }
        };

        Ok(Self {
            table_type: table_type.clone(),
            surfaces,
            lower_surface_threshold: h + config.surface_margin,
            half_width: w / 2.0,
        })
    }

    pub fn table_type(&self) -> &TableType {
        &self.table_type
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    pub fn surface(&self, index: usize) -> Result<&Surface, GeometryError> {
        self.surfaces
            .get(index)
            .ok_or_else(|| GeometryError::NoSuchSurface {
                index,
                table_type: self.table_type.as_str().to_string(),
            })
    }

    /// Index of the surface a global position belongs to.
    pub fn surface_index_of(&self, global: &Point) -> usize {
        match self.table_type {
            TableType::BackToBackDouble if global.x >= self.half_width => 1,
            TableType::FreeStandingDouble if global.y >= self.lower_surface_threshold => 1,
            _ => 0,
        }
    }

    pub fn surface_of(&self, global: &Point) -> &Surface {
        &self.surfaces[self.surface_index_of(global)]
    }

    /// Surface assignment and local coordinates of a global position.
    pub fn locate(&self, global: &Point) -> SurfaceLocation {
        let surface = self.surface_of(global);
        SurfaceLocation {
            surface: surface.index,
            local: surface.to_local(*global),
        }
    }

    /// Bounding size of all surfaces.
    pub fn board_size(&self) -> Size {
        self.surfaces.iter().fold(Size::default(), |acc, s| {
            let r = s.rect();
            Size::new(acc.width.max(r.right()), acc.height.max(r.bottom()))
        })
    }
}
