// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Drives a hand-recorded frame through the headless backend.

use cinder_core::renderer::{
    BlendState, DepthState, DescriptorBindings, DescriptorLayout, DescriptorLayoutId,
    DescriptorSetData, DescriptorSlotKind, DrawCall, GraphicsBackend, GraphicsCommand,
    GraphicsCommandStream, ImageFormat, ImageLayout, PipelineDesc, PipelineKey, RenderPass,
    ResourceDesc, ResourceUsage, ScissorRect, ShaderProgramId,
};
use cinder_infra::HeadlessBackend;

const WIDTH: u32 = 320;
const HEIGHT: u32 = 180;
const BYTECODE: [u8; 8] = [0x03, 0x02, 0x23, 0x07, 0, 0, 0, 0];

struct Scene {
    backend: HeadlessBackend,
    source: cinder_core::ResourceHandle,
    descriptor: cinder_core::DescriptorHandle,
    pipeline: cinder_core::PipelineHandle,
}

fn scene() -> Scene {
    let mut backend = HeadlessBackend::new();
    backend.create_context(WIDTH, HEIGHT).unwrap();

    let layout = DescriptorLayout::new(&[DescriptorSlotKind::SampledImage]).unwrap();
    backend
        .create_descriptor_layout(DescriptorLayoutId::SWAPCHAIN_BLIT, &layout)
        .unwrap();
    let source = backend
        .create_resource(&ResourceDesc::image(
            "source",
            WIDTH,
            HEIGHT,
            ImageFormat::Rgba16Float,
            ResourceUsage::SAMPLED,
        ))
        .unwrap();
    let descriptor = backend
        .create_descriptor(DescriptorLayoutId::SWAPCHAIN_BLIT)
        .unwrap();
    backend
        .write_descriptor(
            DescriptorLayoutId::SWAPCHAIN_BLIT,
            descriptor,
            &DescriptorSetData::new(&[source]).unwrap(),
        )
        .unwrap();

    let key = PipelineKey::new(
        ShaderProgramId::Blit,
        &[backend.swapchain_format()],
        None,
        &[DescriptorLayoutId::SWAPCHAIN_BLIT],
        (WIDTH, HEIGHT),
    )
    .unwrap();
    let pipeline = backend
        .create_pipeline(&PipelineDesc {
            key,
            vertex_bytecode: &BYTECODE,
            fragment_bytecode: &BYTECODE,
            label: "blit",
        })
        .unwrap();

    Scene {
        backend,
        source,
        descriptor,
        pipeline,
    }
}

fn blit_draw(scene: &Scene, depth: DepthState) -> DrawCall {
    DrawCall {
        pipeline: scene.pipeline,
        descriptors: DescriptorBindings::from_slice(&[scene.descriptor]).unwrap(),
        vertex_count: 3,
        instance_count: 1,
        first_vertex: 0,
        first_instance: 0,
        blend: BlendState::Replace,
        depth,
        label: "blit",
    }
}

fn record_blit(
    scene: &Scene,
    stream: &mut GraphicsCommandStream,
    target: cinder_core::ResourceHandle,
) {
    let mut pass = RenderPass::init();
    pass.configure(WIDTH, HEIGHT, &[target], None, 8, "blit")
        .unwrap();

    stream.append(GraphicsCommand::LayoutTransition {
        image: scene.source,
        from: ImageLayout::Undefined,
        to: ImageLayout::ShaderReadOnly,
        label: "source_to_read",
    });
    stream.append(GraphicsCommand::LayoutTransition {
        image: target,
        from: ImageLayout::Undefined,
        to: ImageLayout::ColorAttachment,
        label: "swapchain_to_render",
    });
    pass.start(stream);
    stream.append(GraphicsCommand::SetScissor(ScissorRect::full(WIDTH, HEIGHT)));
    stream.append(GraphicsCommand::Draw(blit_draw(scene, DepthState::OffNoCull)));
    pass.end(stream);
    stream.append(GraphicsCommand::LayoutTransition {
        image: target,
        from: ImageLayout::ColorAttachment,
        to: ImageLayout::Present,
        label: "swapchain_to_present",
    });
}

#[test]
fn well_ordered_frame_is_submitted() {
    let mut scene = scene();
    let target = scene.backend.acquire_frame().unwrap();
    let mut stream = GraphicsCommandStream::new(16);
    record_blit(&scene, &mut stream, target);

    scene.backend.begin_translation().unwrap();
    scene.backend.translate(&stream).unwrap();
    scene.backend.end_translation().unwrap();
    scene.backend.submit_frame().unwrap();

    let frame = scene.backend.last_submitted().unwrap();
    assert_eq!(frame.swapchain_image, target);
    assert_eq!(frame.commands.as_slice(), stream.commands());
}

#[test]
fn presenting_without_final_transition_fails() {
    let mut scene = scene();
    let target = scene.backend.acquire_frame().unwrap();
    let mut stream = GraphicsCommandStream::new(16);
    record_blit(&scene, &mut stream, target);

    // Drop the trailing present transition.
    let mut truncated = GraphicsCommandStream::new(16);
    for cmd in &stream.commands()[..stream.len() - 1] {
        truncated.append(*cmd);
    }

    scene.backend.begin_translation().unwrap();
    scene.backend.translate(&truncated).unwrap();
    scene.backend.end_translation().unwrap();
    assert!(scene.backend.submit_frame().is_err());
    assert!(scene.backend.submitted_frames().is_empty());
}

#[test]
fn pipeline_built_for_old_viewport_is_rejected_after_resize() {
    let mut scene = scene();
    scene.backend.notify_resize(WIDTH * 2, HEIGHT * 2);
    let target = scene.backend.acquire_frame().unwrap();

    let mut pass = RenderPass::init();
    pass.configure(WIDTH * 2, HEIGHT * 2, &[target], None, 8, "blit")
        .unwrap();
    let mut stream = GraphicsCommandStream::new(8);
    stream.append(GraphicsCommand::LayoutTransition {
        image: target,
        from: ImageLayout::Undefined,
        to: ImageLayout::ColorAttachment,
        label: "swapchain_to_render",
    });
    pass.start(&mut stream);
    stream.append(GraphicsCommand::Draw(blit_draw(&scene, DepthState::OffNoCull)));
    pass.end(&mut stream);

    scene.backend.begin_translation().unwrap();
    let err = scene.backend.translate(&stream).unwrap_err();
    assert!(err.to_string().contains("was built for"), "{err}");
}

#[test]
fn depth_tested_draw_without_depth_target_is_rejected() {
    let mut scene = scene();
    let target = scene.backend.acquire_frame().unwrap();

    let mut pass = RenderPass::init();
    pass.configure(WIDTH, HEIGHT, &[target], None, 8, "blit")
        .unwrap();
    let mut stream = GraphicsCommandStream::new(8);
    stream.append(GraphicsCommand::LayoutTransition {
        image: target,
        from: ImageLayout::Undefined,
        to: ImageLayout::ColorAttachment,
        label: "swapchain_to_render",
    });
    pass.start(&mut stream);
    stream.append(GraphicsCommand::Draw(blit_draw(&scene, DepthState::TestAndWrite)));
    pass.end(&mut stream);

    scene.backend.begin_translation().unwrap();
    let err = scene.backend.translate(&stream).unwrap_err();
    assert!(err.to_string().contains("without a depth target"), "{err}");
}
