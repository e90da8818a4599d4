use clap::Parser;
use indicatif::ProgressBar;
use serde_json::Value;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use lisa2coco::coco_dataset::{build_coco_file, write_coco_file};
use lisa2coco::merge::{clip_folders, merge_clip_folders, CLIP_ANNOTATION_FILE};
use lisa2coco::utils::read_annotation_csv;
use lisa2coco::{
    convert_dataset, convert_split, merge_dataset, merge_split, BoxPolicy, ConvertArgs,
    ConvertConfig, ConvertPaths, Error, Split, Subtree,
};

const HEADER: &str = "Filename;Annotation tag;Upper left corner X;Upper left corner Y;\
Lower right corner X;Lower right corner Y;Origin file;Origin frame number;Origin track;\
Origin track frame number";

fn clip_row(file: &str, tag: &str, coords: [i64; 4]) -> String {
    format!(
        "{};{};{};{};{};{};dayTraining/dayClip1.avi;347;dayTraining/dayClip1.avi;347",
        file, tag, coords[0], coords[1], coords[2], coords[3]
    )
}

fn write_clip_csv(folder: &Path, rows: &[String]) {
    fs::create_dir_all(folder).unwrap();
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(folder.join(CLIP_ANNOTATION_FILE), content).unwrap();
}

fn touch_images(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).unwrap();
    for name in names {
        File::create(dir.join(name)).unwrap();
    }
}

/// Lay out a dataset root where every train clip shares one row with the next
/// clip and the test split has a single clip.
fn build_dataset(root: &Path) {
    let train = clip_folders(root, Split::Train, Subtree::Annotations, false);
    for (i, folder) in train.iter().enumerate() {
        write_clip_csv(
            folder,
            &[
                clip_row(&format!("dayTraining/clip--{:05}.jpg", i), "stop", [1, 2, 3, 4]),
                clip_row(&format!("dayTraining/clip--{:05}.jpg", i + 1), "stop", [1, 2, 3, 4]),
            ],
        );
    }
    let test = clip_folders(root, Split::Test, Subtree::Annotations, false);
    write_clip_csv(
        &test[0],
        &[
            clip_row("dayTest/seq--00001.jpg", "yield", [10, 20, 50, 80]),
            clip_row("dayTest/seq--00002.jpg", "addedLane", [0, 0, 5, 5]),
        ],
    );
}

fn paths(root: &Path, out: &Path) -> ConvertPaths {
    ConvertPaths {
        dataset_root: root.to_path_buf(),
        csv_dir: out.to_path_buf(),
        output_dir: out.to_path_buf(),
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_merge_overlapping_clips_counts_union() {
    let temp_dir = tempfile::tempdir().unwrap();
    let first = temp_dir.path().join("first");
    let second = temp_dir.path().join("second");
    write_clip_csv(
        &first,
        &[
            clip_row("d/a.jpg", "stop", [1, 2, 3, 4]),
            clip_row("d/b.jpg", "stop", [1, 2, 3, 4]),
        ],
    );
    write_clip_csv(
        &second,
        &[
            clip_row("d/b.jpg", "stop", [1, 2, 3, 4]),
            clip_row("d/c.jpg", "stop", [1, 2, 3, 4]),
        ],
    );

    let (union, stats) = merge_clip_folders(&[first.clone(), second]).unwrap();
    assert_eq!(union.len(), 3);
    assert_eq!(stats.files_read, 2);
    assert_eq!(stats.rows_read, 4);
    assert_eq!(stats.duplicates_dropped, 1);
    assert_eq!(stats.rows_written, 3);

    let (same, _) = merge_clip_folders(&[first.clone(), first]).unwrap();
    assert_eq!(same.len(), 2);
}

#[test]
fn test_merge_split_writes_comma_csv_without_index() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("lisa");
    let out = temp_dir.path().join("out");
    build_dataset(&root);

    let stats = merge_split(&root, Split::Train, &out, false).unwrap();
    assert_eq!(stats.files_read, 14);
    assert_eq!(stats.rows_read, 28);
    assert_eq!(stats.rows_written, 15);

    let content = fs::read_to_string(out.join("training_data.csv")).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next().unwrap(), HEADER.replace(';', ","));
    assert_eq!(
        lines.next().unwrap(),
        "dayTraining/clip--00000.jpg,stop,1,2,3,4,dayTraining/dayClip1.avi,347,dayTraining/dayClip1.avi,347"
    );
    assert_eq!(content.lines().count(), 16);

    let records = read_annotation_csv(&out.join("training_data.csv"), b',').unwrap();
    assert_eq!(records.len(), 15);
}

#[test]
fn test_merge_is_byte_identical_across_runs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("lisa");
    let first = temp_dir.path().join("run1");
    let second = temp_dir.path().join("run2");
    build_dataset(&root);

    merge_dataset(&root, &first, false).unwrap();
    merge_dataset(&root, &second, false).unwrap();

    for split in Split::ALL {
        let a = fs::read(first.join(split.merged_csv_name())).unwrap();
        let b = fs::read(second.join(split.merged_csv_name())).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_merge_missing_clip_folder_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("lisa");
    build_dataset(&root);
    fs::remove_dir_all(root.join("Annotations/Annotations/dayTrain/dayClip7")).unwrap();

    let err = merge_split(&root, Split::Train, temp_dir.path(), false).unwrap_err();
    assert!(matches!(err, Error::DirectoryNotFound(path) if path.ends_with("dayClip7")));
}

#[test]
fn test_merge_missing_night_clips_fails_only_when_requested() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("lisa");
    build_dataset(&root);

    assert!(merge_split(&root, Split::Test, temp_dir.path(), false).is_ok());
    assert!(merge_split(&root, Split::Test, temp_dir.path(), true).is_err());
}

#[test]
fn test_merge_malformed_csv_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let folder = temp_dir.path().join("clip");
    write_clip_csv(&folder, &[clip_row("d/a.jpg", "stop", [1, 2, 3, 4])]);
    fs::write(
        folder.join(CLIP_ANNOTATION_FILE),
        format!("{}\nd/a.jpg;stop;one;2;3;4;x;1;x;1\n", HEADER),
    )
    .unwrap();

    let err = merge_clip_folders(&[folder]).unwrap_err();
    assert!(matches!(err, Error::Csv { .. }));
}

#[test]
fn test_end_to_end_single_row() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("lisa");
    let out = temp_dir.path().join("out");
    touch_images(
        &root.join("train2017"),
        &["dayClip1--00346.jpg", "dayClip1--00347.jpg"],
    );
    fs::create_dir_all(&out).unwrap();
    fs::write(
        out.join("training_data.csv"),
        "Filename,Annotation tag,Upper left corner X,Upper left corner Y,Lower right corner X,\
Lower right corner Y,Origin file,Origin frame number,Origin track,Origin track frame number\n\
dayTrain/dayClip1--00347.jpg,pedestrianCrossing,10,20,50,80,dayTraining/dayClip1.avi,347,dayTraining/dayClip1.avi,347\n",
    )
    .unwrap();

    let written = convert_split(Split::Train, &paths(&root, &out), &ConvertConfig::default()).unwrap();
    assert_eq!(written, out.join("instances_train2017.json"));

    let json = read_json(&written);
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 5);
    for key in ["info", "licenses", "images", "annotations", "categories"] {
        assert!(keys.contains(&key));
    }

    let annotation = &json["annotations"][0];
    assert_eq!(annotation["bbox"], serde_json::json!([10, 20, 40, 60]));
    assert_eq!(annotation["area"], 2400);
    assert_eq!(
        annotation["segmentation"],
        serde_json::json!([[10, 20, 50, 20, 10, 80, 50, 80]])
    );
    assert_eq!(annotation["image_id"], 1);
    assert_eq!(annotation["category_id"], 1);
    assert_eq!(annotation["iscrowd"], 0);
    assert_eq!(annotation["id"], 1);

    assert_eq!(json["images"][1]["file_name"], "dayClip1--00347.jpg");
    assert_eq!(json["images"][1]["width"], 1280);
    assert_eq!(json["images"][1]["height"], 960);
    assert_eq!(json["categories"][0]["name"], "pedestrianCrossing");
    assert_eq!(json["categories"][0]["supercategory"], "");
    assert_eq!(json["info"]["year"], 2018);
    assert_eq!(json["licenses"][0]["name"], "CC BY-NC-SA 4.0");
}

#[test]
fn test_missing_image_is_a_lookup_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("lisa");
    let out = temp_dir.path().join("out");
    build_dataset(&root);
    touch_images(&root.join("val2017"), &["seq--00001.jpg"]);
    merge_split(&root, Split::Test, &out, false).unwrap();

    let err = convert_split(Split::Test, &paths(&root, &out), &ConvertConfig::default()).unwrap_err();
    match err {
        Error::ImageNotFound { row, file_name } => {
            assert_eq!(row, 2);
            assert_eq!(file_name, "seq--00002.jpg");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!out.join("instances_val2017.json").exists());
}

#[test]
fn test_degenerate_box_policy() {
    let records = read_rows_from(&[clip_row("d/a.jpg", "stop", [50, 80, 10, 20])]);
    let images = vec![lisa2coco::coco::Image::new(0, "a.jpg".to_string(), 1280, 960, 1)];
    let pb = ProgressBar::hidden();

    let kept = build_coco_file(&records, images.clone(), &ConvertConfig::default(), &pb).unwrap();
    assert_eq!(kept.annotations[0].bbox, [50, 80, -40, -60]);

    let config = ConvertConfig {
        box_policy: BoxPolicy::Reject,
        ..ConvertConfig::default()
    };
    let err = build_coco_file(&records, images, &config, &pb).unwrap_err();
    assert!(matches!(err, Error::DegenerateBox { row: 1, .. }));
}

#[test]
fn test_write_coco_file_uses_four_space_indent() {
    let temp_dir = tempfile::tempdir().unwrap();
    let records = read_rows_from(&[clip_row("d/a.jpg", "stop", [1, 2, 3, 4])]);
    let images = vec![lisa2coco::coco::Image::new(0, "a.jpg".to_string(), 1280, 960, 1)];
    let coco_file =
        build_coco_file(&records, images, &ConvertConfig::default(), &ProgressBar::hidden()).unwrap();

    let path = temp_dir.path().join("instances.json");
    write_coco_file(&path, &coco_file).unwrap();
    let content = fs::read_to_string(&path).unwrap();

    assert!(content.starts_with("{\n    \"info\": {\n        \"description\""));
    let info = content.find("\"info\"").unwrap();
    let licenses = content.find("\"licenses\"").unwrap();
    let images = content.find("\"images\"").unwrap();
    let annotations = content.find("\"annotations\"").unwrap();
    let categories = content.find("\"categories\"").unwrap();
    assert!(info < licenses && licenses < images && images < annotations && annotations < categories);
}

#[test]
fn test_full_pipeline() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("lisa");
    let out = temp_dir.path().join("out");
    build_dataset(&root);
    let train_images: Vec<String> = (0..=14).map(|i| format!("clip--{:05}.jpg", i)).collect();
    let train_images: Vec<&str> = train_images.iter().map(String::as_str).collect();
    touch_images(&root.join("train2017"), &train_images);
    touch_images(&root.join("val2017"), &["seq--00001.jpg", "seq--00002.jpg"]);

    merge_dataset(&root, &out, false).unwrap();
    let written: Vec<PathBuf> = convert_dataset(&paths(&root, &out), &ConvertConfig::default()).unwrap();
    assert_eq!(written.len(), 2);

    let train = read_json(&out.join("instances_train2017.json"));
    assert_eq!(train["images"].as_array().unwrap().len(), 15);
    assert_eq!(train["annotations"].as_array().unwrap().len(), 15);
    assert_eq!(train["categories"].as_array().unwrap().len(), 1);
    let ids: Vec<u64> = train["annotations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, (1..=15).collect::<Vec<u64>>());

    let test = read_json(&out.join("instances_val2017.json"));
    let names: Vec<&str> = test["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["addedLane", "yield"]);
    assert_eq!(test["annotations"][0]["category_id"], 2);
    assert_eq!(test["annotations"][1]["image_id"], 1);
}

#[test]
fn test_failed_test_split_writes_no_json() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("lisa");
    let out = temp_dir.path().join("out");
    build_dataset(&root);
    let train_images: Vec<String> = (0..=14).map(|i| format!("clip--{:05}.jpg", i)).collect();
    let train_images: Vec<&str> = train_images.iter().map(String::as_str).collect();
    touch_images(&root.join("train2017"), &train_images);
    touch_images(&root.join("val2017"), &["seq--00001.jpg"]);
    merge_dataset(&root, &out, false).unwrap();

    let err = convert_dataset(&paths(&root, &out), &ConvertConfig::default()).unwrap_err();
    assert!(matches!(err, Error::ImageNotFound { row: 2, .. }));
    assert!(!out.join("instances_train2017.json").exists());
    assert!(!out.join("instances_val2017.json").exists());
}

#[test]
fn test_convert_reads_merged_csv_from_dataset_root() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path().join("lisa");
    let out = temp_dir.path().join("out");
    build_dataset(&root);
    touch_images(&root.join("val2017"), &["seq--00001.jpg", "seq--00002.jpg"]);
    merge_split(&root, Split::Test, &root, false).unwrap();

    let root_arg = root.to_string_lossy().into_owned();
    let out_arg = out.to_string_lossy().into_owned();
    let args =
        ConvertArgs::try_parse_from(["lisa2coco", root_arg.as_str(), "--output_dir", out_arg.as_str()])
            .unwrap();
    let written = convert_split(Split::Test, &args.to_convert_paths(), &args.to_convert_config()).unwrap();

    let json = read_json(&written);
    assert_eq!(json["annotations"].as_array().unwrap().len(), 2);
}

fn read_rows_from(rows: &[String]) -> Vec<lisa2coco::AnnotationRecord> {
    let temp_dir = tempfile::tempdir().unwrap();
    write_clip_csv(temp_dir.path(), rows);
    read_annotation_csv(&temp_dir.path().join(CLIP_ANNOTATION_FILE), b';').unwrap()
}
