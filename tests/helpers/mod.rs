// ==========================================
// 集成测试辅助模块
// ==========================================

#![allow(dead_code)]

pub mod brute_force_solver;
pub mod graph_builder;
