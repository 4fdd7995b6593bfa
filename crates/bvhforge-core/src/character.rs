//! Character skeleton: typed JSON documents and the joint tree.
//!
//! The character file carries a flat, parent-indexed joint list. The tree is
//! rebuilt here once per run; the resulting [`Skeleton`] owns the joints for
//! the duration of the run and every consumer (BVH serializer, tests) walks
//! it through the same depth-first traversal.

use cgmath::Vector3;
use serde::Deserialize;

use crate::error::{ConvertError, ConvertResult};

/// Top-level character document.
#[derive(Debug, Deserialize)]
pub struct CharacterDoc {
    /// The skeleton section.
    #[serde(rename = "Skeleton")]
    pub skeleton: SkeletonDoc,
}

/// Skeleton section of the character document.
#[derive(Debug, Deserialize)]
pub struct SkeletonDoc {
    /// Flat joint list, parents preceding children.
    #[serde(rename = "Joints")]
    pub joints: Vec<JointRecord>,
}

/// One joint record as it appears in the character file.
#[derive(Debug, Clone, Deserialize)]
pub struct JointRecord {
    /// Joint id, referenced by other records' `Parent` field.
    #[serde(rename = "ID")]
    pub id: i64,
    /// Joint name, also emitted into the BVH hierarchy.
    #[serde(rename = "Name")]
    pub name: String,
    /// Joint type tag (e.g. "spherical", "revolute"); informational.
    #[serde(rename = "Type")]
    pub kind: String,
    /// Id of the parent joint; ignored for record 0.
    #[serde(rename = "Parent")]
    pub parent: i64,
    /// Attachment offset from the parent, X component.
    #[serde(rename = "AttachX")]
    pub attach_x: f64,
    /// Attachment offset from the parent, Y component.
    #[serde(rename = "AttachY")]
    pub attach_y: f64,
    /// Attachment offset from the parent, Z component.
    #[serde(rename = "AttachZ")]
    pub attach_z: f64,
}

/// A joint in the resolved tree.
#[derive(Debug, Clone)]
pub struct Joint {
    /// Joint id from the input record.
    pub id: i64,
    /// Joint name.
    pub name: String,
    /// Joint type tag.
    pub kind: String,
    /// Index of the parent joint, `None` for the root.
    pub parent: Option<usize>,
    /// Attachment offset from the parent.
    pub attach: Vector3<f64>,
    /// Child joint indices, in input order.
    pub children: Vec<usize>,
}

/// The resolved joint tree. Record 0 is the root.
#[derive(Debug, Clone)]
pub struct Skeleton {
    joints: Vec<Joint>,
}

impl Skeleton {
    /// Builds the joint tree from the flat record list.
    ///
    /// Each record after the first looks up its parent id among the records
    /// before it and appends itself as a child. An unresolved parent id is a
    /// structural error and aborts the run.
    pub fn from_records(records: &[JointRecord]) -> ConvertResult<Self> {
        if records.is_empty() {
            return Err(ConvertError::EmptySkeleton);
        }

        let mut joints: Vec<Joint> = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let parent = if index == 0 {
                None
            } else {
                let found = joints.iter().position(|j| j.id == record.parent);
                match found {
                    Some(p) => Some(p),
                    None => {
                        return Err(ConvertError::malformed_hierarchy(
                            &record.name,
                            index,
                            record.parent,
                        ))
                    }
                }
            };

            if let Some(p) = parent {
                joints[p].children.push(index);
            }
            joints.push(Joint {
                id: record.id,
                name: record.name.clone(),
                kind: record.kind.clone(),
                parent,
                attach: Vector3::new(record.attach_x, record.attach_y, record.attach_z),
                children: Vec::new(),
            });
        }

        Ok(Self { joints })
    }

    /// Parses a character JSON document and builds the skeleton.
    pub fn from_json(text: &str) -> ConvertResult<Self> {
        let doc: CharacterDoc = serde_json::from_str(text)?;
        Self::from_records(&doc.skeleton.joints)
    }

    /// Number of joints.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// True if the skeleton has no joints (never constructible; kept for
    /// API symmetry with `len`).
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// The joint at `index`.
    pub fn joint(&self, index: usize) -> &Joint {
        &self.joints[index]
    }

    /// The root joint (record 0).
    pub fn root(&self) -> &Joint {
        &self.joints[0]
    }

    /// A copy of the skeleton with the named leaf joint removed, or an
    /// unmodified copy when no childless joint matches (case-insensitive).
    ///
    /// Camera modes that fold the heading into the base joint emit no
    /// trailing camera channel, so the camera marker joint has to leave the
    /// hierarchy as well or the declared channels would outnumber the
    /// assembled values.
    pub fn without_leaf(&self, name: &str) -> Skeleton {
        let removed = self
            .joints
            .iter()
            .position(|j| j.children.is_empty() && j.name.eq_ignore_ascii_case(name));
        let removed = match removed {
            Some(index) => index,
            None => return self.clone(),
        };

        let remap = |index: usize| if index > removed { index - 1 } else { index };
        let joints = self
            .joints
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != removed)
            .map(|(_, joint)| Joint {
                id: joint.id,
                name: joint.name.clone(),
                kind: joint.kind.clone(),
                parent: joint.parent.map(remap),
                attach: joint.attach,
                children: joint
                    .children
                    .iter()
                    .filter(|&&child| child != removed)
                    .map(|&child| remap(child))
                    .collect(),
            })
            .collect();
        Skeleton { joints }
    }

    /// Joint indices in depth-first order: parent before children, children
    /// in input order. The BVH serializer declares channels in exactly this
    /// order, and the frame assembler must emit values in the same order.
    pub fn depth_first(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.joints.len());
        self.visit(0, &mut order);
        order
    }

    fn visit(&self, index: usize, order: &mut Vec<usize>) {
        order.push(index);
        for &child in &self.joints[index].children {
            self.visit(child, order);
        }
    }
}
