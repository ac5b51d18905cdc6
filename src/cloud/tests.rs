use serde_json::json;

use super::{ocrspace, vision};

#[test]
fn vision_words_skip_the_full_text_annotation() {
    let payload = json!({
        "responses": [{
            "textAnnotations": [
                { "description": "Product Qty\nWidget 2" },
                {
                    "description": "Product",
                    "boundingPoly": { "vertices": [
                        {"x": 40, "y": 100}, {"x": 120, "y": 100},
                        {"x": 120, "y": 118}, {"x": 40, "y": 118}
                    ]}
                },
                {
                    "description": "Qty",
                    "boundingPoly": { "vertices": [
                        {"x": 200, "y": 101}, {"x": 240, "y": 101},
                        {"x": 240, "y": 118}, {"x": 200, "y": 118}
                    ]}
                }
            ]
        }]
    });

    let words = vision::words_from_response(&payload);
    assert_eq!(words.len(), 2);
    assert_eq!(words[0].text, "Product");
    assert_eq!(words[0].x0, 40.0);
    assert_eq!(words[0].x1, 120.0);
    assert_eq!(words[1].text, "Qty");
}

#[test]
fn vision_words_tolerate_missing_vertex_coordinates() {
    let payload = json!({
        "responses": [{
            "textAnnotations": [
                { "description": "full text" },
                {
                    "description": "Edge",
                    "boundingPoly": { "vertices": [
                        {"y": 10}, {"x": 30, "y": 10}, {"x": 30, "y": 22}, {"y": 22}
                    ]}
                }
            ]
        }]
    });

    let words = vision::words_from_response(&payload);
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].x0, 0.0);
    assert_eq!(words[0].x1, 30.0);
}

#[test]
fn vision_words_empty_when_no_annotations() {
    let words = vision::words_from_response(&json!({"responses": []}));
    assert!(words.is_empty());
}

#[test]
fn ocrspace_words_read_overlay_geometry() {
    let payload = json!({
        "IsErroredOnProcessing": false,
        "ParsedResults": [{
            "TextOverlay": {
                "Lines": [{
                    "Words": [
                        {"WordText": "Widget", "Left": 40.0, "Top": 130.0, "Width": 90.0, "Height": 18.0},
                        {"WordText": "200.00", "Left": 300.0, "Top": 130.0, "Width": 60.0, "Height": 18.0}
                    ]
                }]
            }
        }]
    });

    let words = ocrspace::words_from_response(&payload).expect("overlay parses");
    assert_eq!(words.len(), 2);
    assert_eq!(words[1].text, "200.00");
    assert_eq!(words[1].x1, 360.0);
}

#[test]
fn ocrspace_processing_error_is_surfaced() {
    let payload = json!({
        "IsErroredOnProcessing": true,
        "ErrorMessage": ["invalid api key"]
    });

    assert!(ocrspace::words_from_response(&payload).is_err());
}
