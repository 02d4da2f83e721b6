mod controls;
mod panels;

pub(super) use panels::show_top_bar;
