//! Dashboard aggregates and the two SVG charts drawn from them.

use serde::Serialize;
use std::f64::consts::PI;
use taskboard_atoms::tasks::{Bucket, BucketCounts};

const PIE_SIZE: f64 = 200.0;
const PIE_RADIUS: f64 = 90.0;
const BAR_AREA_WIDTH: f64 = 300.0;
const BAR_AREA_HEIGHT: f64 = 200.0;
const BAR_WIDTH: f64 = 60.0;
const BAR_GAP: f64 = 30.0;
const BAR_BASELINE: f64 = 175.0;
const BAR_MAX_HEIGHT: f64 = 165.0;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DashboardStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub deleted: usize,
    /// Not deleted: pending + completed
    pub active: usize,
    /// Completed share of active tasks, in percent, one decimal
    pub completion_rate: f64,
}

impl DashboardStats {
    pub fn from_counts(counts: BucketCounts) -> Self {
        let active = counts.pending + counts.completed;
        let completion_rate = if active == 0 {
            0.0
        } else {
            (counts.completed as f64 / active as f64 * 1000.0).round() / 10.0
        };
        Self {
            total: counts.total(),
            pending: counts.pending,
            completed: counts.completed,
            deleted: counts.deleted,
            active,
            completion_rate,
        }
    }
}

fn color(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::Pending => "#f59e0b",
        Bucket::Completed => "#10b981",
        Bucket::Deleted => "#ef4444",
    }
}

fn label(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::Pending => "Pending",
        Bucket::Completed => "Completed",
        Bucket::Deleted => "Deleted",
    }
}

fn count_of(counts: &BucketCounts, bucket: Bucket) -> usize {
    match bucket {
        Bucket::Pending => counts.pending,
        Bucket::Completed => counts.completed,
        Bucket::Deleted => counts.deleted,
    }
}

const BUCKETS: [Bucket; 3] = [Bucket::Pending, Bucket::Completed, Bucket::Deleted];

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PieSlice {
    pub label: &'static str,
    pub count: usize,
    pub percent: f64,
    pub color: &'static str,
    /// SVG path of the wedge; empty when `full_circle`
    pub path: String,
    pub full_circle: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Bar {
    pub label: &'static str,
    pub count: usize,
    pub color: &'static str,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub label_x: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Charts {
    pub empty: bool,
    pub pie: Vec<PieSlice>,
    pub bars: Vec<Bar>,
    pub pie_size: f64,
    pub pie_center: f64,
    pub pie_radius: f64,
    pub bar_width: f64,
    pub bar_height: f64,
    pub label_y: f64,
}

fn point_on_circle(angle: f64) -> (f64, f64) {
    let center = PIE_SIZE / 2.0;
    (center + PIE_RADIUS * angle.cos(), center + PIE_RADIUS * angle.sin())
}

fn pie_slices(counts: &BucketCounts) -> Vec<PieSlice> {
    let total = counts.total();
    if total == 0 {
        return Vec::new();
    }

    let center = PIE_SIZE / 2.0;
    // Start at twelve o'clock, sweep clockwise
    let mut start = -PI / 2.0;
    let mut slices = Vec::new();

    for bucket in BUCKETS {
        let count = count_of(counts, bucket);
        if count == 0 {
            continue;
        }
        let fraction = count as f64 / total as f64;
        let sweep = fraction * 2.0 * PI;
        let full_circle = count == total;

        let path = if full_circle {
            String::new()
        } else {
            let (x1, y1) = point_on_circle(start);
            let (x2, y2) = point_on_circle(start + sweep);
            let large_arc = if sweep > PI { 1 } else { 0 };
            format!(
                "M {c:.2} {c:.2} L {x1:.2} {y1:.2} A {r:.2} {r:.2} 0 {large_arc} 1 {x2:.2} {y2:.2} Z",
                c = center,
                r = PIE_RADIUS,
            )
        };

        slices.push(PieSlice {
            label: label(bucket),
            count,
            percent: fraction * 100.0,
            color: color(bucket),
            path,
            full_circle,
        });
        start += sweep;
    }
    slices
}

fn bars(counts: &BucketCounts) -> Vec<Bar> {
    let max = BUCKETS
        .iter()
        .map(|b| count_of(counts, *b))
        .max()
        .unwrap_or(0)
        .max(1);

    BUCKETS
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let count = count_of(counts, *bucket);
            let height = count as f64 / max as f64 * BAR_MAX_HEIGHT;
            let x = BAR_GAP + i as f64 * (BAR_WIDTH + BAR_GAP);
            Bar {
                label: label(*bucket),
                count,
                color: color(*bucket),
                x,
                y: BAR_BASELINE - height,
                width: BAR_WIDTH,
                height,
                label_x: x + BAR_WIDTH / 2.0,
            }
        })
        .collect()
}

pub fn build_charts(counts: &BucketCounts) -> Charts {
    Charts {
        empty: counts.total() == 0,
        pie: pie_slices(counts),
        bars: bars(counts),
        pie_size: PIE_SIZE,
        pie_center: PIE_SIZE / 2.0,
        pie_radius: PIE_RADIUS,
        bar_width: BAR_AREA_WIDTH,
        bar_height: BAR_AREA_HEIGHT,
        label_y: BAR_AREA_HEIGHT - 4.0,
    }
}
