mod common;

use std::fs;

use comms::msg::Status;
use horner::{Family, KernelProvider, KernelSet};
use worker::handle_request;

use common::Request;

fn serve(req: &Request) -> Status {
    handle_request(&req.config(), &KernelProvider::resolve())
        .unwrap()
        .status
}

#[test]
fn missing_config_is_a_config_error() {
    let req = Request::new("");
    fs::remove_file(req.config()).unwrap();

    assert_eq!(serve(&req), Status::ConfigError);
}

#[test]
fn malformed_coefficients_abandon_the_request() {
    let req = Request::new("implementation = cpp\nsave_results = 1\n");
    fs::write(req.path("coeffs.txt"), "1\ntwo\n3\n").unwrap();

    assert_eq!(serve(&req), Status::InputError);
    assert!(!req.exists("results.txt"));
    assert!(!req.exists("time.txt"));
}

#[test]
fn empty_coefficients_abandon_the_request() {
    let req = Request::new("implementation = cpp\n");
    fs::write(req.path("coeffs.txt"), "").unwrap();

    assert_eq!(serve(&req), Status::InputError);
}

#[test]
fn reversed_point_range_abandons_the_request() {
    let req = Request::new("implementation = cpp\n");
    fs::write(req.path("points.txt"), "1 0 0.1\n").unwrap();

    assert_eq!(serve(&req), Status::InputError);
    assert_eq!(req.read("progress.txt").unwrap(), "0");
}

#[test]
fn progress_restarts_with_each_accepted_request() {
    let req = Request::new("implementation = cpp
");
    assert_eq!(serve(&req), Status::Done);
    assert_eq!(req.read("progress.txt").unwrap(), "100");

    fs::write(req.path("points.txt"), "1 0 0.1
").unwrap();
    assert_eq!(serve(&req), Status::InputError);
    assert_eq!(req.read("progress.txt").unwrap(), "0");
}

#[test]
fn unbounded_point_range_abandons_the_request() {
    let req = Request::new("implementation = cpp
");
    fs::write(req.path("points.txt"), "0 1 1e-30
").unwrap();

    let completion = handle_request(&req.config(), &KernelProvider::resolve()).unwrap();
    assert_eq!(completion.status, Status::InputError);
    assert!(!req.exists("time.txt"));
}

#[test]
fn missing_input_setting_abandons_the_request() {
    let req = Request::new("implementation = cpp\n");
    fs::write(req.config(), "[Settings]\nimplementation = cpp\n").unwrap();

    let completion = handle_request(&req.config(), &KernelProvider::resolve()).unwrap();
    assert_eq!(completion.status, Status::InputError);
    assert!(completion.detail.unwrap().contains("input_coeffs_file"));
}

#[test]
fn unbound_kernel_is_refused() {
    let req = Request::new("implementation = asm\navx = 1\n");
    let resolved = KernelProvider::resolve();
    let kernels = KernelProvider::from_sets(*resolved.kernels(Family::Primary), KernelSet::default());

    let completion = handle_request(&req.config(), &kernels).unwrap();
    assert_eq!(completion.status, Status::KernelUnavailable);
    assert!(!req.exists("time.txt"));
}

#[test]
fn results_are_only_saved_on_request() {
    let req = Request::new("implementation = cpp\nsave_results = 0\n");

    assert_eq!(serve(&req), Status::Done);
    assert!(!req.exists("results.txt"));
    assert!(req.exists("time.txt"));
    assert_eq!(req.read("progress.txt").unwrap(), "100");
}

#[test]
fn output_write_failure_still_counts_as_done() {
    let req = Request::new("implementation = cpp\nsave_results = 1\n");
    fs::create_dir(req.path("results.txt")).unwrap();

    assert_eq!(serve(&req), Status::Done);
    assert!(req.exists("time.txt"));
}

#[test]
fn missing_thread_count_runs_single_threaded() {
    let req = Request::new("implementation = cpp\nmultithreading = 1\nsave_results = 1\n");

    assert_eq!(serve(&req), Status::Done);
    assert_eq!(req.read("results.txt").unwrap().lines().count(), 5);
}
