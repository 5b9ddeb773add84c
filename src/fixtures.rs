//! Seed project: a five-shot documentary on the history of the plague.
//!
//! Used by the CLI `seed` command, benches and tests. Any data satisfying the
//! model invariants would do.

use crate::error::ProjectResult;
use crate::project::model::*;
use crate::project::store::ProjectStore;
use crate::project::timeline::{video_track_from_shots, TimelineClip, TimelineTrack, TrackType};

/// Creation time stamped on seed assets.
const SEED_CREATED_AT: i64 = 1_717_200_000_000;

pub fn seed_assets() -> Vec<Asset> {
    vec![
        Asset::new(
            "asset-town",
            "中世纪欧洲城镇",
            AssetKind::Location {
                atmosphere: "昏暗狭窄的石板街道，木结构建筑，教堂尖塔".into(),
                lighting: "统一的暖黄色调与阴影对比".into(),
            },
        )
        .with_description("贯穿全片的主要场景")
        .with_color("#8a7a5a")
        .with_tags(["城镇", "中世纪"])
        .with_score(94),
        Asset::new(
            "asset-bacillus",
            "鼠疫杆菌微观",
            AssetKind::Prop {
                visual_traits: "杆状细菌的电子显微镜风格渲染，带有生物发光效果".into(),
                scale: "微观".into(),
            },
        )
        .with_description("病原体特写")
        .with_color("#6644aa")
        .with_tags(["微观", "细菌"])
        .with_score(87),
        Asset::new(
            "asset-doctor",
            "鸟嘴医生",
            AssetKind::Character {
                appearance: "标志性的鸟嘴面具".into(),
                costume: "黑色长袍，手持香料棒".into(),
            },
        )
        .with_description("作为贯穿全片的视觉符号")
        .with_color("#3a3a3a")
        .with_tags(["人物", "符号"])
        .with_score(91),
        Asset::new(
            "asset-dataviz",
            "数据可视化叠层",
            AssetKind::Style {
                art_style: "简洁线条风格".into(),
                color_scheme: vec!["#e8b468".into(), "#1a1a1a".into()],
                rules: vec!["琥珀色高亮标注".into(), "统计图不使用阴影".into()],
            },
        )
        .with_description("死亡人数统计图、传播路线地图")
        .with_color("#e8b468")
        .with_tags(["图表"])
        .with_score(76),
        Asset::new(
            "asset-map",
            "贸易路线地图",
            AssetKind::Location {
                atmosphere: "中世纪风格的欧洲-亚洲地图，羊皮纸质感".into(),
                lighting: "烛光".into(),
            },
        )
        .with_description("标注瘟疫传播方向的动态箭头")
        .with_color("#cc8844")
        .with_tags(["地图", "贸易"])
        .with_score(82),
        Asset::new(
            "asset-lazaretto",
            "隔离岛图示",
            AssetKind::Location {
                atmosphere: "威尼斯拉扎雷托岛的鸟瞰重建图".into(),
                lighting: "清晨薄雾".into(),
            },
        )
        .with_description("世界最早的隔离检疫设施")
        .with_color("#44aa88")
        .with_tags(["威尼斯", "检疫"])
        .with_score(96),
    ]
    .into_iter()
    .map(|a| a.with_created_at(SEED_CREATED_AT))
    .collect()
}

pub fn seed_shots() -> Vec<Shot> {
    vec![
        Shot::new("shot-1", 1, "黑死病降临")
            .with_narration("1347年，一支来自东方的热那亚商船队停靠在西西里岛的墨西拿港。船员们身上布满了黑色的脓疮，散发着恶臭——鼠疫，这场改变欧洲命运的瘟疫，就此登陆。")
            .with_duration(14.0)
            .with_shot_type(ShotType::Wide)
            .with_camera_movement(CameraMovement::DollyIn)
            .with_keywords(["商船", "墨西拿港", "鼠疫", "黑死病"])
            .with_visual_notes("夜色中的港口，船帆剪影")
            .with_thumbnail_color("#2a1f4e")
            .with_asset_ref(AssetRef::new("asset-town", AssetType::Location, "背景"))
            .with_asset_ref(AssetRef::new("asset-doctor", AssetType::Character, "主角")),
        Shot::new("shot-2", 2, "死神的使者：鼠与蚤")
            .with_narration("鼠疫杆菌寄生在跳蚤体内，跳蚤又附着在黑鼠身上。当老鼠死去，跳蚤便跳向人类宿主。一次叮咬，就能将致命的病原体注入血液，引发淋巴结肿大与高烧。")
            .with_duration(12.0)
            .with_shot_type(ShotType::Macro)
            .with_camera_movement(CameraMovement::Static)
            .with_keywords(["鼠疫杆菌", "跳蚤", "黑鼠", "淋巴结"])
            .with_visual_notes("显微镜视角，蓝紫色调")
            .with_thumbnail_color("#4e2a1f")
            .with_asset_ref(AssetRef::new("asset-bacillus", AssetType::Prop, "特写")),
        Shot::new("shot-3", 3, "席卷欧洲")
            .with_narration("短短五年间，黑死病沿着贸易路线从意大利蔓延到法国、英格兰、德意志，直至斯堪的纳维亚。城市街道上堆满了无人掩埋的尸体，教堂的丧钟日夜不停地敲响。")
            .with_duration(13.0)
            .with_shot_type(ShotType::Aerial)
            .with_camera_movement(CameraMovement::CraneUp)
            .with_keywords(["贸易路线", "欧洲地图", "蔓延", "死亡"])
            .with_visual_notes("地图上的传播箭头逐步扩散")
            .with_thumbnail_color("#1f3d4e")
            .with_asset_ref(AssetRef::new("asset-map", AssetType::Location, "背景"))
            .with_asset_ref(AssetRef::new("asset-dataviz", AssetType::Style, "叠层")),
        Shot::new("shot-4", 4, "社会崩塌与重建")
            .with_narration("欧洲失去了约三分之一的人口。劳动力极度短缺，农奴制度开始瓦解，幸存的工人获得了前所未有的议价权。黑死病意外地为文艺复兴和现代欧洲的诞生埋下了种子。")
            .with_duration(15.0)
            .with_shot_type(ShotType::Tracking)
            .with_camera_movement(CameraMovement::PanRight)
            .with_keywords(["人口锐减", "农奴制", "劳动力", "文艺复兴"])
            .with_visual_notes("田野到城市的横移")
            .with_thumbnail_color("#4e1f3d")
            .with_asset_ref(AssetRef::new("asset-town", AssetType::Location, "背景"))
            .with_asset_ref(AssetRef::new("asset-dataviz", AssetType::Style, "叠层")),
        Shot::new("shot-5", 5, "瘟疫的遗产")
            .with_narration("从中世纪的隔离制度到现代的公共卫生体系，鼠疫深刻地塑造了人类对抗传染病的方式。威尼斯首创的四十天隔离法，至今仍是'检疫'一词的词源。")
            .with_duration(11.0)
            .with_shot_type(ShotType::Medium)
            .with_camera_movement(CameraMovement::Orbit)
            .with_keywords(["隔离制度", "公共卫生", "检疫", "威尼斯"])
            .with_visual_notes("隔离岛鸟瞰，缓慢环绕")
            .with_thumbnail_color("#1f4e2a")
            .with_asset_ref(AssetRef::new("asset-lazaretto", AssetType::Location, "背景")),
    ]
}

/// Hand-authored report shipped with the seed project.
pub fn seed_report() -> ConsistencyReport {
    ConsistencyReport {
        overall_score: 86,
        issues: vec![
            ConsistencyIssue::new(
                "issue-1",
                IssueSeverity::Warning,
                "数据可视化叠层在镜头 3 与镜头 4 中配色不一致",
            )
            .with_asset("asset-dataviz")
            .with_shot("shot-4"),
            ConsistencyIssue::new(
                "issue-2",
                IssueSeverity::Warning,
                "贸易路线地图的羊皮纸质感与整体风格偏差",
            )
            .with_asset("asset-map"),
            ConsistencyIssue::new("issue-3", IssueSeverity::Info, "鸟嘴医生仅出现在镜头 1")
                .with_asset("asset-doctor")
                .with_shot("shot-1"),
        ],
        checked_at: SEED_CREATED_AT,
    }
}

pub fn seed_tracks(shots: &[Shot]) -> Vec<TimelineTrack> {
    let voiceover = TimelineTrack::new("track-vo", TrackType::Voiceover, "配音")
        .with_clip(TimelineClip::new("vo1", "旁白 1", 1.0, 12.0).with_color("#5a4a2e"))
        .with_clip(TimelineClip::new("vo2", "旁白 2", 15.0, 10.0).with_color("#5a4a2e"))
        .with_clip(TimelineClip::new("vo3", "旁白 3", 27.0, 11.0).with_color("#5a4a2e"))
        .with_clip(TimelineClip::new("vo4", "旁白 4", 40.0, 13.0).with_color("#5a4a2e"))
        .with_clip(TimelineClip::new("vo5", "旁白 5", 55.0, 9.0).with_color("#5a4a2e"));
    let music = TimelineTrack::new("track-music", TrackType::Music, "音乐")
        .with_clip(TimelineClip::new("m1", "暗黑序章", 0.0, 26.0).with_color("#2e3a5a"))
        .with_clip(TimelineClip::new("m2", "紧张推进", 26.0, 28.0).with_color("#3a2e5a"))
        .with_clip(TimelineClip::new("m3", "沉思尾声", 54.0, 11.0).with_color("#2e5a3a"));
    let subtitles = TimelineTrack::new("track-sub", TrackType::Subtitle, "字幕")
        .with_clip(TimelineClip::new("s1", "中文字幕", 1.0, 63.0).with_color("#3a3a3a"));

    vec![video_track_from_shots(shots), voiceover, music, subtitles]
}

/// The complete seed document.
pub fn seed_project() -> ProjectRoot {
    let shots = seed_shots();
    let mut root = ProjectRoot::new("project-plague").with_title("鼠疫的历史：从黑死病到现代公共卫生");
    root.tracks = seed_tracks(&shots);
    root.consistency_report = seed_report();
    for shot in shots {
        root.insert_shot(shot);
    }
    for asset in seed_assets() {
        root.insert_asset(asset);
    }
    root
}

/// A store holding the seed project with the first shot selected.
pub fn seed_store() -> ProjectResult<ProjectStore> {
    let mut store = ProjectStore::from_root(seed_project())?;
    store.select_shot(Some("shot-1"));
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consistency::{average_asset_score, check};
    use crate::narration::annotate;
    use std::collections::HashSet;

    #[test]
    fn test_seed_invariants() {
        let root = seed_project();
        let shots = root.ordered_shots();
        assert_eq!(shots.len(), 5);

        let orders: Vec<i32> = shots.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
        assert!(shots.iter().all(|s| s.duration > 0.0));
        assert_eq!(root.total_duration(), 65.0);

        for shot in &shots {
            let unique: HashSet<&str> = shot.asset_refs.iter().map(|r| r.asset_id.as_str()).collect();
            assert_eq!(unique.len(), shot.asset_refs.len());
            for r in &shot.asset_refs {
                let asset = root.assets.get(&r.asset_id).expect("ref points at a seed asset");
                assert_eq!(asset.asset_type(), r.asset_type);
            }
        }
    }

    #[test]
    fn test_seed_average_score() {
        let assets = seed_assets();
        let scores: Vec<i32> = assets.iter().map(|a| a.consistency_score).collect();
        assert_eq!(scores, vec![94, 87, 91, 76, 82, 96]);
        assert_eq!(average_asset_score(&assets), 88);
    }

    #[test]
    fn test_seed_video_track_matches_shots() {
        let root = seed_project();
        let video = &root.tracks[0];
        assert_eq!(video.track_type, TrackType::Video);
        assert_eq!(video.end_time(), root.total_duration());
    }

    #[test]
    fn test_seed_narration_keywords_present() {
        for shot in seed_shots() {
            let segments = annotate(&shot.narration, &shot.visual_keywords);
            assert!(segments.iter().any(|s| s.highlighted), "{}", shot.id);
        }
    }

    #[test]
    fn test_seed_check() {
        let report = check(&seed_shots(), &seed_assets(), 0);
        // Only the data overlay sits below the conflict threshold.
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].asset_id.as_deref(), Some("asset-dataviz"));
    }

    #[test]
    fn test_seed_store_selection() {
        let mut store = seed_store().unwrap();
        assert_eq!(store.selected_shot().unwrap().unwrap().title, "黑死病降临");
        assert_eq!(store.consistency_report().unwrap().overall_score, 86);
    }
}
