//! Chart configuration shapes derived from a finished run.
//!
//! Pure mapping: nothing here sleeps or logs. The pipeline step that wraps
//! it lives in [`super::PipelineService::generate_visualizations`].

use serde::Serialize;
use termtree::Tree;

use crate::domain::{ConfusionMatrix, DatasetDescriptor, FeatureImportance, PipelineOutput, RocPoint};

pub const PRIMARY: &str = "#667eea";
pub const SECONDARY: &str = "#764ba2";
pub const SUCCESS: &str = "#10b981";
pub const WARNING: &str = "#f59e0b";
pub const ERROR: &str = "#ef4444";
pub const INFO: &str = "#3b82f6";
pub const DARK: &str = "#1f2937";

/// Slice colours, cycled when a dataset has more classes than entries.
const SLICE_COLORS: [&str; 5] = [SUCCESS, ERROR, INFO, WARNING, SECONDARY];

/// Upper bound of the importance axis, in percent.
pub const IMPORTANCE_AXIS_MAX: f64 = 70.0;

const MIN_CELL_ALPHA: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoughnutChart {
    pub labels: Vec<String>,
    pub data: Vec<u32>,
    pub colors: Vec<String>,
}

/// One confusion matrix entry; `x` is the predicted class, `y` the actual one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub x: usize,
    pub y: usize,
    pub v: u32,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapChart {
    pub cells: Vec<HeatmapCell>,
    pub x_labels: Vec<String>,
    pub y_labels: Vec<String>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub axis_max: f64,
    pub horizontal: bool,
    pub colors: [String; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
    pub color: String,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocChart {
    pub curve: LineSeries,
    pub chance: LineSeries,
}

/// Node of the illustrative decision tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub gini: f64,
    pub samples: u32,
    /// Samples per class, `[benign, malignant]`
    pub value: [u32; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn split(name: &str, gini: f64, value: [u32; 2], children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            gini,
            samples: value[0] + value[1],
            value,
            class: None,
            children,
        }
    }

    fn leaf(name: &str, class: &str, value: [u32; 2]) -> Self {
        Self {
            name: name.into(),
            gini: 0.0,
            samples: value[0] + value[1],
            value,
            class: Some(class.into()),
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Render as a text tree, one line per node.
    pub fn to_tree(&self) -> Tree<String> {
        let label = format!(
            "{} (gini={:.3}, samples={}, value=[{}, {}])",
            self.name, self.gini, self.samples, self.value[0], self.value[1]
        );
        let mut tree = Tree::new(label);
        for child in &self.children {
            tree.leaves.push(child.to_tree());
        }
        tree
    }
}

/// The tree shown next to the results; it does not depend on the run.
pub fn decision_tree() -> TreeNode {
    TreeNode::split(
        "perimeter3 ≤ 106.1",
        0.468,
        [357, 212],
        vec![
            TreeNode::leaf("Benign", "benign", [357, 0]),
            TreeNode::split(
                "concave_points3 ≤ 0.135",
                0.394,
                [0, 212],
                vec![
                    TreeNode::split("texture3 ≤ 25.62", 0.444, [0, 45], Vec::new()),
                    TreeNode::leaf("Malignant", "malignant", [0, 167]),
                ],
            ),
        ],
    )
}

/// Every chart of the results page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visualizations {
    pub class_distribution: DoughnutChart,
    pub confusion_matrix: HeatmapChart,
    pub feature_importance: BarChart,
    pub roc_curve: RocChart,
    pub decision_tree: TreeNode,
}

impl Visualizations {
    pub fn from_output(output: &PipelineOutput) -> Self {
        Self {
            class_distribution: class_distribution(&output.dataset),
            confusion_matrix: confusion_heatmap(&output.results.confusion_matrix),
            feature_importance: importance_bars(&output.results.feature_importance),
            roc_curve: roc_chart(&output.results.roc_curve, output.results.metrics.auc),
            decision_tree: decision_tree(),
        }
    }
}

pub fn class_distribution(dataset: &DatasetDescriptor) -> DoughnutChart {
    let colors = SLICE_COLORS.iter().cycle();
    let (labels, (data, colors)): (Vec<_>, (Vec<_>, Vec<_>)) = dataset
        .classes
        .iter()
        .zip(colors)
        .map(|((label, count), color)| (label.clone(), (*count, color.to_string())))
        .unzip();
    DoughnutChart {
        labels,
        data,
        colors,
    }
}

/// Cell opacity grows linearly from 0.2 (zero) to 1.0 (largest entry).
pub fn confusion_heatmap(matrix: &ConfusionMatrix) -> HeatmapChart {
    let max = matrix.iter().flatten().copied().max().unwrap_or(0);
    let cells = matrix
        .iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter().enumerate().map(move |(x, &v)| HeatmapCell {
                x,
                y,
                v,
                alpha: cell_alpha(v, max),
            })
        })
        .collect();
    HeatmapChart {
        cells,
        x_labels: vec!["Predicted benign".into(), "Predicted malignant".into()],
        y_labels: vec!["Actual benign".into(), "Actual malignant".into()],
        color: PRIMARY.into(),
    }
}

fn cell_alpha(value: u32, max: u32) -> f64 {
    if max == 0 {
        return MIN_CELL_ALPHA;
    }
    MIN_CELL_ALPHA + (1.0 - MIN_CELL_ALPHA) * f64::from(value) / f64::from(max)
}

pub fn importance_bars(importance: &FeatureImportance) -> BarChart {
    BarChart {
        labels: importance.features.clone(),
        values: importance.importance.clone(),
        axis_max: IMPORTANCE_AXIS_MAX,
        horizontal: true,
        colors: [PRIMARY.into(), SECONDARY.into()],
    }
}

pub fn roc_chart(points: &[RocPoint], auc: f64) -> RocChart {
    RocChart {
        curve: LineSeries {
            label: format!("ROC curve (AUC = {auc:.2})"),
            points: points
                .iter()
                .map(|p| ChartPoint { x: p.fpr, y: p.tpr })
                .collect(),
            color: PRIMARY.into(),
            dashed: false,
        },
        chance: LineSeries {
            label: "Chance".into(),
            points: vec![ChartPoint { x: 0.0, y: 0.0 }, ChartPoint { x: 1.0, y: 1.0 }],
            color: DARK.into(),
            dashed: true,
        },
    }
}
