//! The persisted form of perspectives and boxes.
//!
//! Points are stored as colon separated coordinate strings, `"x : y : w"` for vanishing points
//! and `"x : y : z : w"` for box corners. A weight of `0` marks a point at infinity.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use vanishing_geometry::{Axis, Pt2, Pt3};

use crate::{Box3D, BoxId, Config, Perspective, PerspectiveId, Scene};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveRecord {
    pub vp_x: Pt2,
    pub vp_y: Pt2,
    pub vp_z: Pt2,
    pub origin: Pt2,
}

impl From<&Perspective> for PerspectiveRecord {
    fn from(perspective: &Perspective) -> Self {
        Self {
            vp_x: perspective.vp(Axis::X),
            vp_y: perspective.vp(Axis::Y),
            vp_z: perspective.vp(Axis::Z),
            origin: perspective.vp(Axis::W),
        }
    }
}

impl PerspectiveRecord {
    pub fn to_perspective(&self) -> Perspective {
        Perspective::new(self.vp_x, self.vp_y, self.vp_z, self.origin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxRecord {
    pub corner0: Pt3,
    pub corner7: Pt3,
    pub perspective: PerspectiveId,
}

impl From<&Box3D> for BoxRecord {
    fn from(bx: &Box3D) -> Self {
        let (corner0, corner7) = bx.corners();
        Self {
            corner0,
            corner7,
            perspective: bx.perspective(),
        }
    }
}

/// All perspectives and boxes of a scene.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<PerspectiveId>,
    #[serde(default)]
    pub perspectives: Vec<PerspectiveEntry>,
    #[serde(default)]
    pub boxes: Vec<BoxEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveEntry {
    pub id: PerspectiveId,
    #[serde(flatten)]
    pub record: PerspectiveRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxEntry {
    pub id: BoxId,
    #[serde(flatten)]
    pub record: BoxRecord,
}

impl SceneRecord {
    pub fn from_toml(toml: &str) -> Result<Self> {
        toml::from_str(toml).context("Failed to parse the scene record")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).context("Failed to write the scene record")
    }
}

impl Scene {
    pub fn perspective_record(&self, id: PerspectiveId) -> Result<PerspectiveRecord> {
        Ok(self.perspective(id)?.into())
    }

    pub fn box_record(&self, id: BoxId) -> Result<BoxRecord> {
        Ok(self.box3d(id)?.into())
    }

    /// Recreate a perspective under its persisted id.
    pub fn restore_perspective(
        &mut self,
        id: PerspectiveId,
        record: &PerspectiveRecord,
    ) -> Result<()> {
        if self.perspective(id).is_ok() {
            bail!("{id} already exists");
        }
        self.reserve_perspective_id(id);
        self.insert_perspective(id, record.to_perspective());
        Ok(())
    }

    /// Recreate a box under its persisted id. Its perspective must already be restored.
    pub fn restore_box(&mut self, id: BoxId, record: &BoxRecord) -> Result<()> {
        if self.box3d(id).is_ok() {
            bail!("{id} already exists");
        }
        self.perspective(record.perspective)
            .with_context(|| format!("Failed to restore {id}"))?;
        self.reserve_box_id(id);
        self.insert_box(id, Box3D::new(record.perspective, record.corner0, record.corner7))
    }

    pub fn to_record(&self) -> SceneRecord {
        SceneRecord {
            current: self.current_perspective(),
            perspectives: self
                .perspectives()
                .map(|(id, perspective)| PerspectiveEntry {
                    id,
                    record: perspective.into(),
                })
                .collect(),
            boxes: self
                .boxes()
                .map(|(id, bx)| BoxEntry {
                    id,
                    record: bx.into(),
                })
                .collect(),
        }
    }

    pub fn from_record(config: Config, record: &SceneRecord) -> Result<Self> {
        let mut scene = Scene::new(config);
        for entry in &record.perspectives {
            scene.restore_perspective(entry.id, &entry.record)?;
        }
        for entry in &record.boxes {
            scene.restore_box(entry.id, &entry.record)?;
        }
        if let Some(current) = record.current {
            scene
                .set_current_perspective(current)
                .context("Failed to restore the current perspective")?;
        }
        Ok(scene)
    }
}
