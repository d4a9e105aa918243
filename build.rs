// 构建脚本: 生成COCO类别名称表 (class_id → name)
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const COCO_NAMES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich",
    "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote",
    "keyboard", "cell phone", "microwave", "oven", "toaster", "sink", "refrigerator", "book",
    "clock", "vase", "scissors", "teddy bear", "hair drier", "toothbrush",
];

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set by cargo");
    let path = Path::new(&out_dir).join("coco_names.rs");
    let mut file = BufWriter::new(File::create(&path).expect("create coco_names.rs"));

    // phf_codegen 需要值的Rust字面量表示
    let literals: Vec<String> = COCO_NAMES.iter().map(|name| format!("{:?}", name)).collect();

    let mut map = phf_codegen::Map::new();
    for (index, literal) in literals.iter().enumerate() {
        map.entry(index as u32, literal.as_str());
    }

    writeln!(
        &mut file,
        "static COCO_CLASS_NAMES: phf::Map<u32, &'static str> = {};",
        map.build()
    )
    .expect("write coco_names.rs");

    println!("cargo:rerun-if-changed=build.rs");
}
