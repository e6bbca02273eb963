// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use ocisnap_core::{
    AttachmentState, BootVolumeId, CompartmentId, InstanceId, InstanceState, IpLifetime,
    PrivateIpId, PublicIpId, SubnetId, VnicId, VolumeGroupId, VolumeGroupState, VolumeId,
    VolumeState,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::Failures;
use crate::cloud::CloudAdapter;
use crate::error::AdapterError;
use crate::models::{
    AttachVolumeDetails, BootVolume, BootVolumeAttachment, CreateVolumeGroupDetails, FreeformTags,
    Instance, InstanceSourceDetails, LaunchInstanceDetails, PrivateIp, PublicIp, ShapeConfig,
    UpdateVolumeDetails, Vnic, VnicAttachment, Volume, VolumeAttachment, VolumeGroup,
    VolumeGroupSource, VolumeSource,
};

/// Recorded mutating call
#[derive(Debug, Clone, PartialEq)]
pub enum CloudCall {
    UpdateInstanceTags { id: InstanceId, tags: FreeformTags },
    TerminateInstance { id: InstanceId, preserve_boot_volume: bool },
    LaunchInstance { display_name: String, boot_volume_id: BootVolumeId },
    AttachVolume { instance_id: InstanceId, volume_id: VolumeId },
    AssignPublicIp { id: PublicIpId, private_ip_id: PrivateIpId },
    UpdateBootVolume { id: BootVolumeId, update: UpdateVolumeDetails },
    DeleteBootVolume { id: BootVolumeId },
    UpdateVolume { id: VolumeId, update: UpdateVolumeDetails },
    DeleteVolume { id: VolumeId },
    CreateVolumeGroup { display_name: String },
    DeleteVolumeGroup { id: VolumeGroupId },
}

/// Description of an instance to place in the fake world
#[derive(Debug, Clone)]
pub struct InstanceSeed {
    pub display_name: String,
    pub compartment_id: CompartmentId,
    pub availability_domain: String,
    pub state: InstanceState,
    pub boot_volume_name: String,
    /// Attached block volumes: display name and device path
    pub block_volumes: Vec<(String, Option<String>)>,
    pub public_ip: Option<IpLifetime>,
    /// Secondary VNICs beyond the primary one
    pub extra_vnics: usize,
    pub freeform_tags: FreeformTags,
}

impl InstanceSeed {
    pub fn new(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            compartment_id: CompartmentId::new("ocid1.compartment.oc1..prod"),
            availability_domain: "Uocm:PHX-AD-1".to_string(),
            state: InstanceState::Running,
            boot_volume_name: format!("{display_name} (Boot Volume)"),
            block_volumes: Vec::new(),
            public_ip: None,
            extra_vnics: 0,
            freeform_tags: FreeformTags::new(),
        }
    }

    pub fn compartment(mut self, id: &str) -> Self {
        self.compartment_id = CompartmentId::new(id);
        self
    }

    pub fn availability_domain(mut self, ad: &str) -> Self {
        self.availability_domain = ad.to_string();
        self
    }

    pub fn state(mut self, state: InstanceState) -> Self {
        self.state = state;
        self
    }

    pub fn block_volume(mut self, name: &str, device: Option<&str>) -> Self {
        self.block_volumes.push((name.to_string(), device.map(str::to_string)));
        self
    }

    pub fn public_ip(mut self, lifetime: IpLifetime) -> Self {
        self.public_ip = Some(lifetime);
        self
    }

    pub fn extra_vnics(mut self, count: usize) -> Self {
        self.extra_vnics = count;
        self
    }

    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.freeform_tags.insert(key.to_string(), value.to_string());
        self
    }
}

/// Identifiers of a seeded instance and its resources
#[derive(Debug, Clone)]
pub struct SeededInstance {
    pub instance_id: InstanceId,
    pub boot_volume_id: BootVolumeId,
    pub volume_ids: Vec<VolumeId>,
    pub vnic_id: VnicId,
    pub private_ip_id: PrivateIpId,
    pub public_ip_id: Option<PublicIpId>,
}

/// A state the resource reaches after `polls` more reads
#[derive(Debug, Clone, Copy)]
struct Transition<S> {
    to: S,
    polls: u32,
}

impl<S: Copy> Transition<S> {
    /// Count one read; returns the new state once settled
    fn tick(&mut self) -> Option<S> {
        if self.polls == 0 {
            return Some(self.to);
        }
        self.polls -= 1;
        None
    }
}

struct FakeInstance {
    instance: Instance,
    transition: Option<Transition<InstanceState>>,
}

struct FakeGroup {
    group: VolumeGroup,
    transition: Option<Transition<VolumeGroupState>>,
}

#[derive(Default)]
struct World {
    instances: BTreeMap<InstanceId, FakeInstance>,
    boot_volumes: BTreeMap<BootVolumeId, BootVolume>,
    volumes: BTreeMap<VolumeId, Volume>,
    groups: BTreeMap<VolumeGroupId, FakeGroup>,
    vnics: BTreeMap<VnicId, Vnic>,
    vnic_attachments: Vec<VnicAttachment>,
    private_ips: Vec<PrivateIp>,
    public_ips: Vec<PublicIp>,
    boot_attachments: Vec<BootVolumeAttachment>,
    volume_attachments: Vec<VolumeAttachment>,
    launches: Vec<LaunchInstanceDetails>,
    calls: Vec<CloudCall>,
    failures: Failures,
    settle_polls: u32,
    clone_fault: bool,
    seq: u64,
}

impl World {
    fn next_id(&mut self, kind: &str) -> String {
        self.seq += 1;
        format!("ocid1.{kind}.oc1..fake{:04}", self.seq)
    }

    fn next_ip(&mut self, prefix: &str) -> String {
        self.seq += 1;
        format!("{prefix}.{}", self.seq % 250 + 2)
    }

    fn add_vnic(
        &mut self,
        instance_id: &InstanceId,
        vnic: Vnic,
        private_ip: String,
    ) -> (VnicId, PrivateIpId) {
        let vnic_id = vnic.id.clone();
        let private_ip_id = PrivateIpId::new(self.next_id("privateip"));
        let attachment_id = self.next_id("vnicattachment");
        self.vnic_attachments.push(VnicAttachment {
            id: attachment_id,
            instance_id: instance_id.clone(),
            vnic_id: Some(vnic_id.clone()),
            lifecycle_state: AttachmentState::Attached,
        });
        self.private_ips.push(PrivateIp {
            id: private_ip_id.clone(),
            ip_address: private_ip,
            is_primary: Some(true),
            vnic_id: Some(vnic_id.clone()),
        });
        self.vnics.insert(vnic_id.clone(), vnic);
        (vnic_id, private_ip_id)
    }

    fn attach_boot_volume(&mut self, instance_id: &InstanceId, boot_volume_id: &BootVolumeId) {
        let id = self.next_id("bootvolumeattachment");
        self.boot_attachments.push(BootVolumeAttachment {
            id,
            instance_id: instance_id.clone(),
            boot_volume_id: boot_volume_id.clone(),
            lifecycle_state: AttachmentState::Attached,
        });
    }

    fn instance_mut(&mut self, id: &InstanceId) -> Result<&mut FakeInstance, AdapterError> {
        self.instances.get_mut(id).ok_or_else(|| AdapterError::NotFound(id.to_string()))
    }

    /// Whether a volume (boot or block) with this OCID exists
    fn volume_exists(&self, id: &str) -> bool {
        self.boot_volumes.contains_key(id) || self.volumes.contains_key(id)
    }

    fn clone_volumes(&mut self, source_ids: &[String]) -> Vec<String> {
        let mut cloned = Vec::with_capacity(source_ids.len());
        for source in source_ids {
            if let Some(boot) = self.boot_volumes.get(source.as_str()).cloned() {
                let id = BootVolumeId::new(self.next_id("bootvolume"));
                self.boot_volumes.insert(
                    id.clone(),
                    BootVolume {
                        id: id.clone(),
                        display_name: format!("{} (Clone)", boot.display_name),
                        lifecycle_state: VolumeState::Available,
                        source_details: Some(VolumeSource {
                            kind: "bootVolume".to_string(),
                            id: boot.id.to_string(),
                        }),
                        freeform_tags: FreeformTags::new(),
                    },
                );
                cloned.push(id.to_string());
            } else if let Some(volume) = self.volumes.get(source.as_str()).cloned() {
                let id = VolumeId::new(self.next_id("volume"));
                self.volumes.insert(
                    id.clone(),
                    Volume {
                        id: id.clone(),
                        display_name: format!("{} (Clone)", volume.display_name),
                        lifecycle_state: VolumeState::Available,
                        source_details: Some(VolumeSource {
                            kind: "volume".to_string(),
                            id: volume.id.to_string(),
                        }),
                        freeform_tags: FreeformTags::new(),
                    },
                );
                cloned.push(id.to_string());
            }
        }
        cloned
    }
}

/// In-memory compute, block storage and network control plane.
///
/// Instances and volume groups move through transitional states
/// (`TERMINATING`, `PROVISIONING`) for a configurable number of reads
/// before settling, so wait loops get exercised.
#[derive(Clone)]
pub struct FakeCloud {
    inner: Arc<Mutex<World>>,
}

impl Default for FakeCloud {
    fn default() -> Self {
        Self { inner: Arc::new(Mutex::new(World { settle_polls: 1, ..World::default() })) }
    }
}

impl FakeCloud {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance with its boot volume, block volumes, primary VNIC and
    /// optional public IP.
    pub fn seed(&self, seed: InstanceSeed) -> SeededInstance {
        let mut world = self.inner.lock();
        let instance_id = InstanceId::new(world.next_id("instance"));

        let boot_volume_id = BootVolumeId::new(world.next_id("bootvolume"));
        world.boot_volumes.insert(
            boot_volume_id.clone(),
            BootVolume {
                id: boot_volume_id.clone(),
                display_name: seed.boot_volume_name.clone(),
                lifecycle_state: VolumeState::Available,
                source_details: None,
                freeform_tags: FreeformTags::new(),
            },
        );
        world.attach_boot_volume(&instance_id, &boot_volume_id);

        let mut volume_ids = Vec::new();
        for (name, device) in &seed.block_volumes {
            let volume_id = VolumeId::new(world.next_id("volume"));
            world.volumes.insert(
                volume_id.clone(),
                Volume {
                    id: volume_id.clone(),
                    display_name: name.clone(),
                    lifecycle_state: VolumeState::Available,
                    source_details: None,
                    freeform_tags: FreeformTags::new(),
                },
            );
            let attachment_id = world.next_id("volumeattachment");
            world.volume_attachments.push(VolumeAttachment {
                id: attachment_id,
                instance_id: instance_id.clone(),
                volume_id: volume_id.clone(),
                attachment_type: "paravirtualized".to_string(),
                device: device.clone(),
                display_name: Some(format!("{name}-attachment")),
                is_read_only: Some(false),
                is_shareable: Some(false),
                lifecycle_state: AttachmentState::Attached,
            });
            volume_ids.push(volume_id);
        }

        let private_ip = world.next_ip("10.0.0");
        let public_ip = seed.public_ip.map(|_| "203.0.113.10".to_string());
        let vnic = Vnic {
            id: VnicId::new(world.next_id("vnic")),
            display_name: Some(seed.display_name.clone()),
            hostname_label: Some(seed.display_name.to_lowercase()),
            is_primary: Some(true),
            private_ip: Some(private_ip.clone()),
            public_ip: public_ip.clone(),
            subnet_id: SubnetId::new("ocid1.subnet.oc1..app"),
            nsg_ids: vec!["ocid1.networksecuritygroup.oc1..web".to_string()],
            skip_source_dest_check: Some(false),
            freeform_tags: FreeformTags::from([("role".to_string(), "web".to_string())]),
            defined_tags: Default::default(),
        };
        let (vnic_id, private_ip_id) = world.add_vnic(&instance_id, vnic, private_ip);

        for n in 0..seed.extra_vnics {
            let extra_ip = world.next_ip("10.0.1");
            let vnic = Vnic {
                id: VnicId::new(world.next_id("vnic")),
                display_name: Some(format!("{}-secondary{n}", seed.display_name)),
                hostname_label: None,
                is_primary: Some(false),
                private_ip: Some(extra_ip.clone()),
                public_ip: None,
                subnet_id: SubnetId::new("ocid1.subnet.oc1..backend"),
                nsg_ids: Vec::new(),
                skip_source_dest_check: None,
                freeform_tags: FreeformTags::new(),
                defined_tags: Default::default(),
            };
            world.add_vnic(&instance_id, vnic, extra_ip);
        }

        let public_ip_id = match (seed.public_ip, public_ip) {
            (Some(lifetime), Some(address)) => {
                let id = PublicIpId::new(world.next_id("publicip"));
                world.public_ips.push(PublicIp {
                    id: id.clone(),
                    ip_address: address,
                    lifetime,
                    private_ip_id: Some(private_ip_id.clone()),
                });
                Some(id)
            }
            _ => None,
        };

        let instance = Instance {
            id: instance_id.clone(),
            display_name: seed.display_name.clone(),
            compartment_id: seed.compartment_id.clone(),
            availability_domain: seed.availability_domain.clone(),
            lifecycle_state: seed.state,
            fault_domain: Some("FAULT-DOMAIN-2".to_string()),
            shape: "VM.Standard.E4.Flex".to_string(),
            shape_config: Some(ShapeConfig { ocpus: Some(2.0), memory_in_gbs: Some(32.0) }),
            metadata: BTreeMap::from([(
                "ssh_authorized_keys".to_string(),
                "ssh-ed25519 AAAA ops".to_string(),
            )]),
            extended_metadata: BTreeMap::new(),
            freeform_tags: seed.freeform_tags.clone(),
            defined_tags: Default::default(),
        };
        world.instances.insert(instance_id.clone(), FakeInstance { instance, transition: None });

        SeededInstance {
            instance_id,
            boot_volume_id,
            volume_ids,
            vnic_id,
            private_ip_id,
            public_ip_id,
        }
    }

    /// Reads a transitional resource answers before reaching its target state
    pub fn set_settle_polls(&self, polls: u32) {
        self.inner.lock().settle_polls = polls;
    }

    /// Cloned volume groups end up `FAULTY` instead of `AVAILABLE`
    pub fn set_clone_fault(&self, fault: bool) {
        self.inner.lock().clone_fault = fault;
    }

    /// Fail the next call of `op` (the trait method name) with `error`.
    pub fn fail_next(&self, op: &'static str, error: AdapterError) {
        self.inner.lock().failures.push(op, None, error);
    }

    /// Fail the next call of `op` on the resource `target` with `error`.
    ///
    /// `target` is the resource OCID, or the display name for
    /// `create_volume_group` and `launch_instance`.
    pub fn fail_on(&self, op: &'static str, target: &str, error: AdapterError) {
        self.inner.lock().failures.push(op, Some(target.to_string()), error);
    }

    /// Mutating calls, in order
    pub fn calls(&self) -> Vec<CloudCall> {
        self.inner.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().calls.clear();
    }

    pub fn instance(&self, id: &InstanceId) -> Option<Instance> {
        self.inner.lock().instances.get(id).map(|i| i.instance.clone())
    }

    /// Remove an instance outright, as if it had been purged
    pub fn forget_instance(&self, id: &InstanceId) {
        self.inner.lock().instances.remove(id);
    }

    pub fn boot_volume(&self, id: &BootVolumeId) -> Option<BootVolume> {
        self.inner.lock().boot_volumes.get(id).cloned()
    }

    pub fn boot_volumes(&self) -> Vec<BootVolume> {
        self.inner.lock().boot_volumes.values().cloned().collect()
    }

    pub fn volume(&self, id: &VolumeId) -> Option<Volume> {
        self.inner.lock().volumes.get(id).cloned()
    }

    pub fn volumes(&self) -> Vec<Volume> {
        self.inner.lock().volumes.values().cloned().collect()
    }

    pub fn volume_groups(&self) -> Vec<VolumeGroup> {
        self.inner.lock().groups.values().map(|g| g.group.clone()).collect()
    }

    /// Block volume attachments of an instance that are still attached
    pub fn attached_volumes(&self, instance_id: &InstanceId) -> Vec<VolumeAttachment> {
        self.inner
            .lock()
            .volume_attachments
            .iter()
            .filter(|a| {
                a.instance_id == *instance_id && a.lifecycle_state == AttachmentState::Attached
            })
            .cloned()
            .collect()
    }

    pub fn public_ip(&self, id: &PublicIpId) -> Option<PublicIp> {
        self.inner.lock().public_ips.iter().find(|p| p.id == *id).cloned()
    }

    /// Primary private IP of an instance's first VNIC
    pub fn primary_private_ip(&self, instance_id: &InstanceId) -> Option<PrivateIp> {
        let world = self.inner.lock();
        let vnic_id = world
            .vnic_attachments
            .iter()
            .find(|a| a.instance_id == *instance_id)
            .and_then(|a| a.vnic_id.clone())?;
        world.private_ips.iter().find(|p| p.vnic_id.as_ref() == Some(&vnic_id)).cloned()
    }

    /// Launch requests received, in order
    pub fn launches(&self) -> Vec<LaunchInstanceDetails> {
        self.inner.lock().launches.clone()
    }
}

#[async_trait]
impl CloudAdapter for FakeCloud {
    async fn get_instance(&self, id: &InstanceId) -> Result<Instance, AdapterError> {
        let mut world = self.inner.lock();
        world.failures.take("get_instance", id)?;
        let fake = world.instance_mut(id)?;
        if let Some(state) = fake.transition.as_mut().and_then(Transition::tick) {
            fake.instance.lifecycle_state = state;
            fake.transition = None;
        }
        Ok(fake.instance.clone())
    }

    async fn update_instance_tags(
        &self,
        id: &InstanceId,
        tags: &FreeformTags,
    ) -> Result<(), AdapterError> {
        let mut world = self.inner.lock();
        world.calls.push(CloudCall::UpdateInstanceTags { id: id.clone(), tags: tags.clone() });
        world.failures.take("update_instance_tags", id)?;
        world.instance_mut(id)?.instance.freeform_tags = tags.clone();
        Ok(())
    }

    async fn terminate_instance(
        &self,
        id: &InstanceId,
        preserve_boot_volume: bool,
    ) -> Result<(), AdapterError> {
        let mut world = self.inner.lock();
        world
            .calls
            .push(CloudCall::TerminateInstance { id: id.clone(), preserve_boot_volume });
        world.failures.take("terminate_instance", id)?;
        let polls = world.settle_polls;
        let fake = world.instance_mut(id)?;
        fake.instance.lifecycle_state = InstanceState::Terminating;
        fake.transition = Some(Transition { to: InstanceState::Terminated, polls });

        let mut released_boot = Vec::new();
        for attachment in world.boot_attachments.iter_mut().filter(|a| a.instance_id == *id) {
            attachment.lifecycle_state = AttachmentState::Detached;
            released_boot.push(attachment.boot_volume_id.clone());
        }
        if !preserve_boot_volume {
            for boot_volume_id in released_boot {
                world.boot_volumes.remove(&boot_volume_id);
            }
        }
        for attachment in world.volume_attachments.iter_mut().filter(|a| a.instance_id == *id) {
            attachment.lifecycle_state = AttachmentState::Detached;
        }

        let vnic_ids: Vec<VnicId> = world
            .vnic_attachments
            .iter()
            .filter(|a| a.instance_id == *id)
            .filter_map(|a| a.vnic_id.clone())
            .collect();
        world.vnic_attachments.retain(|a| a.instance_id != *id);
        let private_ip_ids: Vec<PrivateIpId> = world
            .private_ips
            .iter()
            .filter(|p| p.vnic_id.as_ref().is_some_and(|v| vnic_ids.contains(v)))
            .map(|p| p.id.clone())
            .collect();
        world.private_ips.retain(|p| !private_ip_ids.contains(&p.id));
        for vnic_id in &vnic_ids {
            world.vnics.remove(vnic_id);
        }
        // Ephemeral IPs die with their private IP; reserved ones are unassigned
        world.public_ips.retain(|p| {
            p.lifetime != IpLifetime::Ephemeral
                || !p.private_ip_id.as_ref().is_some_and(|ip| private_ip_ids.contains(ip))
        });
        for public_ip in world.public_ips.iter_mut() {
            if public_ip.private_ip_id.as_ref().is_some_and(|ip| private_ip_ids.contains(ip)) {
                public_ip.private_ip_id = None;
            }
        }
        Ok(())
    }

    async fn launch_instance(
        &self,
        details: &LaunchInstanceDetails,
    ) -> Result<Instance, AdapterError> {
        let InstanceSourceDetails::BootVolume { boot_volume_id } = &details.source_details;
        let mut world = self.inner.lock();
        world.calls.push(CloudCall::LaunchInstance {
            display_name: details.display_name.clone(),
            boot_volume_id: boot_volume_id.clone(),
        });
        world.failures.take("launch_instance", &details.display_name)?;
        if !world.boot_volumes.contains_key(boot_volume_id) {
            return Err(AdapterError::NotFound(boot_volume_id.to_string()));
        }
        let in_use = world.boot_attachments.iter().any(|a| {
            a.boot_volume_id == *boot_volume_id && a.lifecycle_state == AttachmentState::Attached
        });
        if in_use {
            return Err(AdapterError::Conflict(format!("{boot_volume_id} is attached")));
        }

        let instance_id = InstanceId::new(world.next_id("instance"));
        world.attach_boot_volume(&instance_id, boot_volume_id);

        let vnic_details = &details.create_vnic_details;
        let private_ip = match &vnic_details.private_ip {
            Some(ip) => ip.clone(),
            None => world.next_ip("10.0.0"),
        };
        let vnic = Vnic {
            id: VnicId::new(world.next_id("vnic")),
            display_name: vnic_details.display_name.clone(),
            hostname_label: vnic_details.hostname_label.clone(),
            is_primary: Some(true),
            private_ip: Some(private_ip.clone()),
            public_ip: None,
            subnet_id: vnic_details.subnet_id.clone(),
            nsg_ids: vnic_details.nsg_ids.clone(),
            skip_source_dest_check: vnic_details.skip_source_dest_check,
            freeform_tags: vnic_details.freeform_tags.clone(),
            defined_tags: vnic_details.defined_tags.clone(),
        };
        world.add_vnic(&instance_id, vnic, private_ip);

        let instance = Instance {
            id: instance_id.clone(),
            display_name: details.display_name.clone(),
            compartment_id: details.compartment_id.clone(),
            availability_domain: details.availability_domain.clone(),
            lifecycle_state: InstanceState::Provisioning,
            fault_domain: details.fault_domain.clone(),
            shape: details.shape.clone(),
            shape_config: details.shape_config.clone(),
            metadata: details.metadata.clone(),
            extended_metadata: details.extended_metadata.clone(),
            freeform_tags: details.freeform_tags.clone(),
            defined_tags: details.defined_tags.clone(),
        };
        let polls = world.settle_polls;
        world.instances.insert(
            instance_id,
            FakeInstance {
                instance: instance.clone(),
                transition: Some(Transition { to: InstanceState::Running, polls }),
            },
        );
        world.launches.push(details.clone());
        Ok(instance)
    }

    async fn list_vnic_attachments(
        &self,
        _compartment_id: &CompartmentId,
        instance_id: &InstanceId,
    ) -> Result<Vec<VnicAttachment>, AdapterError> {
        let mut world = self.inner.lock();
        world.failures.take("list_vnic_attachments", instance_id)?;
        Ok(world.vnic_attachments.iter().filter(|a| a.instance_id == *instance_id).cloned().collect())
    }

    async fn list_boot_volume_attachments(
        &self,
        _availability_domain: &str,
        _compartment_id: &CompartmentId,
        instance_id: &InstanceId,
    ) -> Result<Vec<BootVolumeAttachment>, AdapterError> {
        let mut world = self.inner.lock();
        world.failures.take("list_boot_volume_attachments", instance_id)?;
        Ok(world.boot_attachments.iter().filter(|a| a.instance_id == *instance_id).cloned().collect())
    }

    async fn list_volume_attachments(
        &self,
        _compartment_id: &CompartmentId,
        instance_id: &InstanceId,
    ) -> Result<Vec<VolumeAttachment>, AdapterError> {
        let mut world = self.inner.lock();
        world.failures.take("list_volume_attachments", instance_id)?;
        Ok(world
            .volume_attachments
            .iter()
            .filter(|a| a.instance_id == *instance_id)
            .cloned()
            .collect())
    }

    async fn attach_volume(
        &self,
        details: &AttachVolumeDetails,
    ) -> Result<VolumeAttachment, AdapterError> {
        let mut world = self.inner.lock();
        world.calls.push(CloudCall::AttachVolume {
            instance_id: details.instance_id.clone(),
            volume_id: details.volume_id.clone(),
        });
        world.failures.take("attach_volume", &details.volume_id)?;
        if !world.volumes.contains_key(&details.volume_id) {
            return Err(AdapterError::NotFound(details.volume_id.to_string()));
        }
        if !world.instances.contains_key(&details.instance_id) {
            return Err(AdapterError::NotFound(details.instance_id.to_string()));
        }
        let attachment = VolumeAttachment {
            id: world.next_id("volumeattachment"),
            instance_id: details.instance_id.clone(),
            volume_id: details.volume_id.clone(),
            attachment_type: details.attachment_type.clone(),
            device: details.device.clone(),
            display_name: details.display_name.clone(),
            is_read_only: Some(details.is_read_only),
            is_shareable: Some(details.is_shareable),
            lifecycle_state: AttachmentState::Attached,
        };
        world.volume_attachments.push(attachment.clone());
        Ok(attachment)
    }

    async fn get_vnic(&self, id: &VnicId) -> Result<Vnic, AdapterError> {
        let mut world = self.inner.lock();
        world.failures.take("get_vnic", id)?;
        world.vnics.get(id).cloned().ok_or_else(|| AdapterError::NotFound(id.to_string()))
    }

    async fn list_private_ips(&self, vnic_id: &VnicId) -> Result<Vec<PrivateIp>, AdapterError> {
        let mut world = self.inner.lock();
        world.failures.take("list_private_ips", vnic_id)?;
        Ok(world
            .private_ips
            .iter()
            .filter(|p| p.vnic_id.as_ref() == Some(vnic_id))
            .cloned()
            .collect())
    }

    async fn get_public_ip_by_address(&self, ip_address: &str) -> Result<PublicIp, AdapterError> {
        let mut world = self.inner.lock();
        world.failures.take("get_public_ip_by_address", ip_address)?;
        world
            .public_ips
            .iter()
            .find(|p| p.ip_address == ip_address)
            .cloned()
            .ok_or_else(|| AdapterError::NotFound(ip_address.to_string()))
    }

    async fn assign_public_ip(
        &self,
        id: &PublicIpId,
        private_ip_id: &PrivateIpId,
    ) -> Result<(), AdapterError> {
        let mut world = self.inner.lock();
        world
            .calls
            .push(CloudCall::AssignPublicIp { id: id.clone(), private_ip_id: private_ip_id.clone() });
        world.failures.take("assign_public_ip", id)?;
        if !world.private_ips.iter().any(|p| p.id == *private_ip_id) {
            return Err(AdapterError::NotFound(private_ip_id.to_string()));
        }
        let public_ip = world
            .public_ips
            .iter_mut()
            .find(|p| p.id == *id)
            .ok_or_else(|| AdapterError::NotFound(id.to_string()))?;
        public_ip.private_ip_id = Some(private_ip_id.clone());
        Ok(())
    }

    async fn get_boot_volume(&self, id: &BootVolumeId) -> Result<BootVolume, AdapterError> {
        let mut world = self.inner.lock();
        world.failures.take("get_boot_volume", id)?;
        world.boot_volumes.get(id).cloned().ok_or_else(|| AdapterError::NotFound(id.to_string()))
    }

    async fn update_boot_volume(
        &self,
        id: &BootVolumeId,
        update: &UpdateVolumeDetails,
    ) -> Result<(), AdapterError> {
        let mut world = self.inner.lock();
        world.calls.push(CloudCall::UpdateBootVolume { id: id.clone(), update: update.clone() });
        world.failures.take("update_boot_volume", id)?;
        let volume =
            world.boot_volumes.get_mut(id).ok_or_else(|| AdapterError::NotFound(id.to_string()))?;
        if let Some(name) = &update.display_name {
            volume.display_name = name.clone();
        }
        if let Some(tags) = &update.freeform_tags {
            volume.freeform_tags = tags.clone();
        }
        Ok(())
    }

    async fn delete_boot_volume(&self, id: &BootVolumeId) -> Result<(), AdapterError> {
        let mut world = self.inner.lock();
        world.calls.push(CloudCall::DeleteBootVolume { id: id.clone() });
        world.failures.take("delete_boot_volume", id)?;
        world.boot_volumes.remove(id).map(drop).ok_or_else(|| AdapterError::NotFound(id.to_string()))
    }

    async fn get_volume(&self, id: &VolumeId) -> Result<Volume, AdapterError> {
        let mut world = self.inner.lock();
        world.failures.take("get_volume", id)?;
        world.volumes.get(id).cloned().ok_or_else(|| AdapterError::NotFound(id.to_string()))
    }

    async fn update_volume(
        &self,
        id: &VolumeId,
        update: &UpdateVolumeDetails,
    ) -> Result<(), AdapterError> {
        let mut world = self.inner.lock();
        world.calls.push(CloudCall::UpdateVolume { id: id.clone(), update: update.clone() });
        world.failures.take("update_volume", id)?;
        let volume =
            world.volumes.get_mut(id).ok_or_else(|| AdapterError::NotFound(id.to_string()))?;
        if let Some(name) = &update.display_name {
            volume.display_name = name.clone();
        }
        if let Some(tags) = &update.freeform_tags {
            volume.freeform_tags = tags.clone();
        }
        Ok(())
    }

    async fn delete_volume(&self, id: &VolumeId) -> Result<(), AdapterError> {
        let mut world = self.inner.lock();
        world.calls.push(CloudCall::DeleteVolume { id: id.clone() });
        world.failures.take("delete_volume", id)?;
        let attached = world
            .volume_attachments
            .iter()
            .any(|a| a.volume_id == *id && a.lifecycle_state == AttachmentState::Attached);
        if attached {
            return Err(AdapterError::Conflict(format!("{id} is attached")));
        }
        world.volumes.remove(id).map(drop).ok_or_else(|| AdapterError::NotFound(id.to_string()))
    }

    async fn create_volume_group(
        &self,
        details: &CreateVolumeGroupDetails,
    ) -> Result<VolumeGroup, AdapterError> {
        let mut world = self.inner.lock();
        world.calls.push(CloudCall::CreateVolumeGroup { display_name: details.display_name.clone() });
        world.failures.take("create_volume_group", &details.display_name)?;

        let (volume_ids, transition) = match &details.source_details {
            VolumeGroupSource::Volumes { volume_ids } => {
                if let Some(missing) = volume_ids.iter().find(|id| !world.volume_exists(id)) {
                    return Err(AdapterError::NotFound(missing.clone()));
                }
                (volume_ids.clone(), None)
            }
            VolumeGroupSource::Clone { volume_group_id } => {
                let source = world
                    .groups
                    .get(volume_group_id)
                    .map(|g| g.group.volume_ids.clone())
                    .ok_or_else(|| AdapterError::NotFound(volume_group_id.to_string()))?;
                let to = if world.clone_fault {
                    VolumeGroupState::Faulty
                } else {
                    VolumeGroupState::Available
                };
                (world.clone_volumes(&source), Some(Transition { to, polls: world.settle_polls }))
            }
        };

        let group = VolumeGroup {
            id: VolumeGroupId::new(world.next_id("volumegroup")),
            display_name: details.display_name.clone(),
            lifecycle_state: if transition.is_some() {
                VolumeGroupState::Provisioning
            } else {
                VolumeGroupState::Available
            },
            volume_ids,
        };
        world.groups.insert(group.id.clone(), FakeGroup { group: group.clone(), transition });
        Ok(group)
    }

    async fn get_volume_group(&self, id: &VolumeGroupId) -> Result<VolumeGroup, AdapterError> {
        let mut world = self.inner.lock();
        world.failures.take("get_volume_group", id)?;
        let fake =
            world.groups.get_mut(id).ok_or_else(|| AdapterError::NotFound(id.to_string()))?;
        if let Some(state) = fake.transition.as_mut().and_then(Transition::tick) {
            fake.group.lifecycle_state = state;
            fake.transition = None;
        }
        Ok(fake.group.clone())
    }

    async fn delete_volume_group(&self, id: &VolumeGroupId) -> Result<(), AdapterError> {
        let mut world = self.inner.lock();
        world.calls.push(CloudCall::DeleteVolumeGroup { id: id.clone() });
        world.failures.take("delete_volume_group", id)?;
        world.groups.remove(id).map(drop).ok_or_else(|| AdapterError::NotFound(id.to_string()))
    }
}
